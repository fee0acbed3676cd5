#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Environmental signal value types shared across the agromap system.
//!
//! Every signal fetcher produces a [`SignalOutcome`] and the fallback
//! resolver consumes it. The outcome is never collapsed to a bare value
//! before resolution — doing so would lose the partial-failure
//! information the three-tier fallback depends on.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which fallback tier produced a resolved signal value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SignalTier {
    /// The primary remote raster dataset.
    Primary,
    /// A secondary point-based REST provider.
    Secondary,
    /// The static domain default.
    Default,
}

/// The result of querying one environmental signal at one tier.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalOutcome<T> {
    /// The signal was measured, tagged with the tier that produced it.
    Available {
        /// The measured value.
        value: T,
        /// The tier that produced it.
        source: SignalTier,
    },
    /// The signal could not be measured at this tier.
    Unavailable {
        /// Why the tier came up empty (logged, never surfaced).
        reason: String,
    },
}

impl<T> SignalOutcome<T> {
    /// Wraps a measured value from the given tier.
    pub const fn available(value: T, source: SignalTier) -> Self {
        Self::Available { value, source }
    }

    /// Marks the signal unavailable at this tier.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Whether a value was produced.
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

/// Topsoil chemistry (0–5 cm), already de-scaled to physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilSample {
    /// Soil pH in water, nominal 0–14.
    pub ph: f64,
    /// Soil organic carbon, percent.
    pub organic_carbon_pct: f64,
}

/// Long-term climate normals over the field polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateNormals {
    /// Average annual total precipitation, mm.
    pub rainfall_mm_per_year: f64,
    /// Mean 2 m air temperature, °C.
    pub mean_temp_c: f64,
}

/// Static tier-3 defaults, one per signal.
///
/// These are the values the resolver substitutes when both remote tiers
/// come up empty, chosen as representative for farmland in Northern
/// Nigeria.
pub mod defaults {
    /// Topsoil pH.
    pub const SOIL_PH: f64 = 6.5;
    /// Topsoil organic carbon, percent.
    pub const SOIL_ORGANIC_CARBON_PCT: f64 = 1.2;
    /// Mean air temperature, °C.
    pub const MEAN_TEMP_C: f64 = 27.0;
    /// Average annual total precipitation, mm.
    pub const ANNUAL_RAINFALL_MM: f64 = 1200.0;
    /// Vegetation index (NDVI).
    pub const NDVI: f64 = 0.45;
    /// Placeholder thumbnail shown when no imagery could be rendered.
    pub const IMAGE_URL: &str = "https://via.placeholder.com/400x300.png?text=No+Satellite+Image";

    use super::{ClimateNormals, SoilSample};

    /// The default soil sample as a value.
    #[must_use]
    pub const fn soil() -> SoilSample {
        SoilSample {
            ph: SOIL_PH,
            organic_carbon_pct: SOIL_ORGANIC_CARBON_PCT,
        }
    }

    /// The default climate normals as a value.
    #[must_use]
    pub const fn climate() -> ClimateNormals {
        ClimateNormals {
            rainfall_mm_per_year: ANNUAL_RAINFALL_MM,
            mean_temp_c: MEAN_TEMP_C,
        }
    }
}

/// One resolved signal value together with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved<T> {
    /// The final value.
    pub value: T,
    /// The tier that produced it.
    pub source: SignalTier,
}

/// The fully resolved set of environmental signals for one field.
///
/// Every numeric field is finite by construction: the fallback resolver
/// has already substituted a default for anything the remote tiers
/// could not measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSignals {
    /// True-color thumbnail URL for the field.
    pub imagery: Resolved<String>,
    /// Topsoil chemistry.
    pub soil: Resolved<SoilSample>,
    /// Climate normals.
    pub climate: Resolved<ClimateNormals>,
    /// Mean vegetation index, nominal −1..1.
    pub vegetation_index: Resolved<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_round_trips_through_strings() {
        for tier in [
            SignalTier::Primary,
            SignalTier::Secondary,
            SignalTier::Default,
        ] {
            let text = tier.to_string();
            assert_eq!(text.parse::<SignalTier>().unwrap(), tier);
        }
    }

    #[test]
    fn tier_serializes_snake_case() {
        assert_eq!(SignalTier::Secondary.to_string(), "secondary");
        assert_eq!(
            serde_json::to_value(SignalTier::Default).unwrap(),
            serde_json::json!("default")
        );
    }

    #[test]
    fn outcome_availability() {
        let ok = SignalOutcome::available(0.5_f64, SignalTier::Primary);
        assert!(ok.is_available());

        let missing: SignalOutcome<f64> = SignalOutcome::unavailable("no coverage");
        assert!(!missing.is_available());
    }

    #[test]
    fn defaults_are_finite() {
        let soil = defaults::soil();
        let climate = defaults::climate();
        assert!(soil.ph.is_finite());
        assert!(soil.organic_carbon_pct.is_finite());
        assert!(climate.rainfall_mm_per_year.is_finite());
        assert!(climate.mean_temp_c.is_finite());
        assert!(defaults::NDVI.is_finite());
        assert!(!defaults::IMAGE_URL.is_empty());
    }
}
