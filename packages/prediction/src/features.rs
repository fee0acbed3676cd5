//! Feature vector assembly.
//!
//! The model consumes a fixed-order numeric vector. The order below is
//! the training order; the golden test at the bottom is the regression
//! guard — if assembly and the test disagree, the assembly is wrong.

/// Number of model input features.
pub const FEATURE_COUNT: usize = 11;

/// Resolved signal values as supplied by the caller.
///
/// These arrive with the prediction request — the pipeline is not
/// re-run for predictions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalReadings {
    /// Average annual total precipitation, mm.
    pub rainfall_total_mm: f64,
    /// Mean air temperature, °C.
    pub avg_temp_c: f64,
    /// Mean vegetation index.
    pub ndvi_mean: f64,
    /// Topsoil pH.
    pub soil_ph: f64,
    /// Topsoil organic carbon, percent.
    pub soil_org_carbon_pct: f64,
}

/// Caller-supplied farm metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct FarmMetadata {
    /// State name, encoded via the trained state encoder.
    pub state: String,
    /// Fertilizer application rate, kg/ha.
    pub fertilizer_rate_kg_per_ha: f64,
    /// Pesticide application rate, L/ha.
    pub pesticide_rate_l_per_ha: f64,
    /// Total farm size, ha.
    pub farm_size_ha: f64,
    /// Irrigated area, ha.
    pub irrigated_area_ha: f64,
}

/// Assembles the model input vector in training order.
#[must_use]
pub fn assemble(
    state_code: u32,
    year: i32,
    signals: &SignalReadings,
    metadata: &FarmMetadata,
) -> [f64; FEATURE_COUNT] {
    [
        f64::from(state_code),
        f64::from(year),
        signals.rainfall_total_mm,
        signals.avg_temp_c,
        signals.ndvi_mean,
        signals.soil_ph,
        signals.soil_org_carbon_pct,
        metadata.fertilizer_rate_kg_per_ha,
        metadata.pesticide_rate_l_per_ha,
        metadata.farm_size_ha,
        metadata.irrigated_area_ha,
    ]
}
