#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Environmental signal acquisition for the agromap backend.
//!
//! Four independent fetchers query the primary raster engine for one
//! signal each — true-color imagery, topsoil chemistry, climate
//! normals, and the vegetation index. Every fetcher produces a
//! [`agromap_signal_models::SignalOutcome`]; the [`resolver`] walks the
//! three fallback tiers (primary raster dataset, secondary point-based
//! REST provider, static default) until one yields a value, and the
//! [`pipeline`] fans all four resolutions out concurrently and joins
//! them into one complete report.
//!
//! The invariant this crate exists to uphold: a report leaving the
//! pipeline has every field populated and finite, no matter which
//! remote services were down.

pub mod climate;
pub mod engine;
pub mod imagery;
pub mod pipeline;
pub mod resolver;
pub mod soil;
#[cfg(test)]
pub(crate) mod testutil;
pub mod vegetation;

use chrono::{Duration, NaiveDate, Utc};

/// The trailing ~1-year acquisition window used by the optical
/// fetchers, as `(start, end)` dates.
#[must_use]
pub fn trailing_year() -> (NaiveDate, NaiveDate) {
    let end = Utc::now().date_naive();
    (end - Duration::days(365), end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_year_spans_a_year() {
        let (start, end) = trailing_year();
        assert_eq!((end - start).num_days(), 365);
    }
}
