//! Climate normals fetcher.
//!
//! Two reductions over the field polygon: the PERSIANN-CDR daily
//! precipitation collection summed over its full multi-decade extent
//! and divided by the years spanned, and the ERA5 monthly 2 m air
//! temperature averaged over its extent and converted to Celsius.

use agromap_geometry::RegionGeometry;
use agromap_signal_models::{ClimateNormals, SignalOutcome, SignalTier};
use chrono::NaiveDate;

use crate::engine::{CollectionMeanRequest, RasterEngine, TemporalReducer};

/// Multi-decade daily precipitation collection.
pub const PRECIP_COLLECTION: &str = "NOAA/PERSIANN-CDR";
const PRECIP_BAND: &str = "precipitation";
/// Dataset extent covered by the sum.
const PRECIP_START: (i32, u32, u32) = (1983, 1, 1);
const PRECIP_END: (i32, u32, u32) = (2024, 1, 1);
/// Native precipitation resolution.
const PRECIP_SCALE_M: f64 = 5_000.0;

/// Monthly reanalysis air temperature collection (Kelvin).
pub const TEMP_COLLECTION: &str = "ECMWF/ERA5/MONTHLY";
const TEMP_BAND: &str = "mean_2m_air_temperature";
const TEMP_START: (i32, u32, u32) = (1979, 1, 1);
const TEMP_END: (i32, u32, u32) = (2024, 1, 1);
const TEMP_SCALE_M: f64 = 30_000.0;

const KELVIN_OFFSET: f64 = 273.15;

fn date(parts: (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(parts.0, parts.1, parts.2).expect("static dataset dates are valid")
}

/// Converts a reanalysis temperature to Celsius.
///
/// The band contract says Kelvin, but a value under 100 can only
/// already be Celsius, so leave it alone rather than report −246 °C.
fn to_celsius(value: f64) -> f64 {
    if value > 100.0 {
        value - KELVIN_OFFSET
    } else {
        value
    }
}

/// Fetches long-term climate normals for the field.
pub async fn fetch(
    engine: &dyn RasterEngine,
    region: &RegionGeometry,
) -> SignalOutcome<ClimateNormals> {
    let precip_start = date(PRECIP_START);
    let precip_end = date(PRECIP_END);
    let precip_request = CollectionMeanRequest {
        collection: PRECIP_COLLECTION,
        band: PRECIP_BAND,
        start_date: precip_start,
        end_date: precip_end,
        temporal: TemporalReducer::Sum,
        region: region.ring(),
        scale_m: PRECIP_SCALE_M,
    };
    let temp_request = CollectionMeanRequest {
        collection: TEMP_COLLECTION,
        band: TEMP_BAND,
        start_date: date(TEMP_START),
        end_date: date(TEMP_END),
        temporal: TemporalReducer::Mean,
        region: region.ring(),
        scale_m: TEMP_SCALE_M,
    };

    let (total_precip, mean_temp) = tokio::join!(
        engine.collection_band_mean(&precip_request),
        engine.collection_band_mean(&temp_request),
    );

    let total_precip = match total_precip {
        Ok(value) => value,
        Err(e) => return SignalOutcome::unavailable(format!("precipitation reduction failed: {e}")),
    };
    let mean_temp = match mean_temp {
        Ok(value) => value,
        Err(e) => return SignalOutcome::unavailable(format!("temperature reduction failed: {e}")),
    };

    match (total_precip, mean_temp) {
        (Some(total), Some(temp)) => {
            let years = f64::from(PRECIP_END.0 - PRECIP_START.0);
            SignalOutcome::available(
                ClimateNormals {
                    rainfall_mm_per_year: total / years,
                    mean_temp_c: to_celsius(temp),
                },
                SignalTier::Primary,
            )
        }
        _ => SignalOutcome::unavailable("climate collections not covered at this location"),
    }
}
