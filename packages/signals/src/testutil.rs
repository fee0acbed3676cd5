//! Scripted [`RasterEngine`] stub shared by the unit tests.

use std::collections::BTreeMap;

use crate::engine::{
    CollectionMeanRequest, CompositeRequest, EngineError, ImageMeanRequest, IndexMeanRequest,
    RasterEngine, VisParams,
};

/// A raster engine with canned responses per asset id.
///
/// Unscripted calls return an [`EngineError::Rejected`], so the default
/// stub behaves like an engine that is down across the board.
#[derive(Default)]
pub struct StubEngine {
    /// Composite band names; `None` scripts an error.
    pub bands: Option<Vec<String>>,
    /// Thumbnail URL; `None` scripts an error.
    pub thumbnail: Option<String>,
    /// Regional means keyed by image asset id.
    pub image_means: BTreeMap<String, Option<f64>>,
    /// Regional means keyed by collection asset id.
    pub collection_means: BTreeMap<String, Option<f64>>,
    /// Normalized-difference mean; `None` scripts an error.
    pub index_mean: Option<Option<f64>>,
}

fn rejected() -> EngineError {
    EngineError::Rejected {
        message: "scripted failure".to_string(),
    }
}

#[async_trait::async_trait]
impl RasterEngine for StubEngine {
    async fn composite_bands(
        &self,
        _req: &CompositeRequest<'_>,
    ) -> Result<Vec<String>, EngineError> {
        self.bands.clone().ok_or_else(rejected)
    }

    async fn composite_thumbnail(
        &self,
        _req: &CompositeRequest<'_>,
        _vis: &VisParams<'_>,
        _frame: &[[f64; 2]],
    ) -> Result<String, EngineError> {
        self.thumbnail.clone().ok_or_else(rejected)
    }

    async fn image_band_mean(
        &self,
        req: &ImageMeanRequest<'_>,
    ) -> Result<Option<f64>, EngineError> {
        self.image_means
            .get(req.image)
            .copied()
            .ok_or_else(rejected)
    }

    async fn collection_band_mean(
        &self,
        req: &CollectionMeanRequest<'_>,
    ) -> Result<Option<f64>, EngineError> {
        self.collection_means
            .get(req.collection)
            .copied()
            .ok_or_else(rejected)
    }

    async fn normalized_difference_mean(
        &self,
        _req: &IndexMeanRequest<'_>,
    ) -> Result<Option<f64>, EngineError> {
        self.index_mean.ok_or_else(rejected)
    }
}

/// A small field near Kano for exercising the fetchers.
#[must_use]
pub fn test_region() -> agromap_geometry::RegionGeometry {
    let polygon =
        agromap_geometry::FieldPolygon::new(vec![[12.0, 8.5], [12.0, 8.51], [12.01, 8.51]])
            .unwrap();
    agromap_geometry::RegionGeometry::from_polygon(&polygon).unwrap()
}
