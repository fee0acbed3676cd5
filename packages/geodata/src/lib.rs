#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Point-based REST providers used as fallbacks by the signal pipeline.
//!
//! When the primary raster engine cannot produce a signal, the resolver
//! retries against one of these providers, querying by the polygon's
//! representative point rather than the full region:
//!
//! 1. **ISRIC SoilGrids v2** — topsoil pH and organic carbon.
//! 2. **Open-Meteo archive** — daily temperature and precipitation over
//!    the trailing year, reduced to annual normals.
//! 3. **Nominatim / OpenStreetMap** — reverse geocoding for the
//!    display-only administrative region name.
//!
//! Providers are configured via TOML files in `services/`, embedded at
//! compile time through the [`service_registry`].

pub mod nominatim;
pub mod openmeteo;
pub mod service_registry;
pub mod soilgrids;

use thiserror::Error;

/// Errors from fallback provider requests.
#[derive(Debug, Error)]
pub enum GeodataError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}
