//! True-color imagery fetcher.
//!
//! Builds a median composite of the trailing year's cloud-filtered
//! Sentinel-2 scenes over the field and renders a fixed-size true-color
//! thumbnail. The median across the filtered stack suppresses residual
//! cloud and shadow noise that survives the metadata filter.

use agromap_geometry::RegionGeometry;
use agromap_signal_models::{SignalOutcome, SignalTier};

use crate::engine::{CompositeRequest, RasterEngine, VisParams};
use crate::trailing_year;

/// Harmonized Sentinel-2 surface reflectance collection.
pub const COLLECTION: &str = "COPERNICUS/S2_SR_HARMONIZED";
/// Scene metadata property holding cloud cover percent.
const CLOUD_PROPERTY: &str = "CLOUDY_PIXEL_PERCENTAGE";
/// Maximum admissible scene cloud cover.
const MAX_CLOUD_PCT: f64 = 10.0;
/// Bands mapped to red, green, blue.
const TRUE_COLOR_BANDS: [&str; 3] = ["B4", "B3", "B2"];
/// Linear reflectance stretch.
const STRETCH_MIN: f64 = 0.0;
const STRETCH_MAX: f64 = 3000.0;
const GAMMA: f64 = 1.2;
/// Thumbnail edge length in pixels.
const THUMBNAIL_DIMENSIONS: u32 = 512;

/// Fetches a true-color thumbnail URL for the field.
///
/// Small fields are framed by the buffered imagery bounds so the
/// thumbnail shows usable context. Zero usable bands in the composite
/// means no cloud-free scene covered the field in the window.
pub async fn fetch(engine: &dyn RasterEngine, region: &RegionGeometry) -> SignalOutcome<String> {
    let (start_date, end_date) = trailing_year();
    let request = CompositeRequest {
        collection: COLLECTION,
        start_date,
        end_date,
        cloud_property: CLOUD_PROPERTY,
        max_cloud_pct: MAX_CLOUD_PCT,
        region: region.ring(),
    };

    let bands = match engine.composite_bands(&request).await {
        Ok(bands) => bands,
        Err(e) => return SignalOutcome::unavailable(format!("composite probe failed: {e}")),
    };
    if bands.is_empty() {
        return SignalOutcome::unavailable("no cloud-free imagery");
    }

    let vis = VisParams {
        bands: TRUE_COLOR_BANDS,
        min: STRETCH_MIN,
        max: STRETCH_MAX,
        gamma: GAMMA,
        dimensions: THUMBNAIL_DIMENSIONS,
    };
    let frame = region.imagery_bounds().ring();
    match engine.composite_thumbnail(&request, &vis, &frame).await {
        Ok(url) => SignalOutcome::available(url, SignalTier::Primary),
        Err(e) => SignalOutcome::unavailable(format!("thumbnail render failed: {e}")),
    }
}
