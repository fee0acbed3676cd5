//! Vegetation index fetcher.
//!
//! Computes the per-scene NIR/red normalized difference over the
//! trailing year of cloud-filtered Sentinel-2 scenes, averages it in
//! time, then reduces the result over the field polygon at 20 m. The
//! cloud threshold is looser than the imagery fetcher's — a scene too
//! hazy for a thumbnail still carries a usable index.

use agromap_geometry::RegionGeometry;
use agromap_signal_models::{SignalOutcome, SignalTier};

use crate::engine::{IndexMeanRequest, RasterEngine};
use crate::trailing_year;

/// Harmonized Sentinel-2 surface reflectance collection.
const COLLECTION: &str = "COPERNICUS/S2_SR_HARMONIZED";
const NIR_BAND: &str = "B8";
const RED_BAND: &str = "B4";
const CLOUD_PROPERTY: &str = "CLOUDY_PIXEL_PERCENTAGE";
const MAX_CLOUD_PCT: f64 = 20.0;
const SCALE_M: f64 = 20.0;

/// Fetches the mean vegetation index for the field.
pub async fn fetch(engine: &dyn RasterEngine, region: &RegionGeometry) -> SignalOutcome<f64> {
    let (start_date, end_date) = trailing_year();
    let request = IndexMeanRequest {
        collection: COLLECTION,
        nir_band: NIR_BAND,
        red_band: RED_BAND,
        start_date,
        end_date,
        cloud_property: CLOUD_PROPERTY,
        max_cloud_pct: MAX_CLOUD_PCT,
        region: region.ring(),
        scale_m: SCALE_M,
    };

    match engine.normalized_difference_mean(&request).await {
        Ok(Some(value)) => SignalOutcome::available(value, SignalTier::Primary),
        Ok(None) => SignalOutcome::unavailable("no vegetation index coverage"),
        Err(e) => SignalOutcome::unavailable(format!("index reduction failed: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{StubEngine, test_region};

    #[tokio::test]
    async fn passes_through_the_reduced_index() {
        let engine = StubEngine {
            index_mean: Some(Some(0.62)),
            ..StubEngine::default()
        };
        assert_eq!(
            fetch(&engine, &test_region()).await,
            SignalOutcome::available(0.62, SignalTier::Primary)
        );
    }

    #[tokio::test]
    async fn empty_reduction_is_unavailable() {
        let engine = StubEngine {
            index_mean: Some(None),
            ..StubEngine::default()
        };
        assert!(!fetch(&engine, &test_region()).await.is_available());
    }

    #[tokio::test]
    async fn engine_error_never_propagates() {
        assert!(
            !fetch(&StubEngine::default(), &test_region())
                .await
                .is_available()
        );
    }
}
