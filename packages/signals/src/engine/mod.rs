//! Raster query engine interface.
//!
//! The primary tier of every signal is served by a hosted geospatial
//! engine that can reduce raster datasets over arbitrary polygons and
//! render composites. This module defines the narrow interface the
//! fetchers need; [`rest`] implements it over the engine's REST API.
//! Credential bootstrap happens outside this crate — the engine client
//! receives an already-issued bearer token.

pub mod rest;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors from raster engine operations.
///
/// Deliberately narrow: transport, rejected credentials, a rejected
/// request, or a malformed response. Fetchers map all of these to an
/// unavailable signal; anything else is a programming error and should
/// surface, not be swallowed.
#[derive(Debug, Error)]
pub enum EngineError {
    /// HTTP request failed (includes timeouts).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The engine rejected the supplied credentials.
    #[error("engine rejected credentials")]
    Unauthorized,

    /// The engine rejected the request.
    #[error("engine rejected request: {message}")]
    Rejected {
        /// The engine's error message.
        message: String,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

/// How a collection is reduced along its time axis before the regional
/// reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalReducer {
    /// Per-pixel sum across all images.
    Sum,
    /// Per-pixel mean across all images.
    Mean,
}

/// A cloud-filtered composite over an optical collection.
#[derive(Debug, Clone)]
pub struct CompositeRequest<'a> {
    /// Collection asset id.
    pub collection: &'a str,
    /// Window start (inclusive).
    pub start_date: NaiveDate,
    /// Window end (exclusive).
    pub end_date: NaiveDate,
    /// Metadata property holding per-image cloud cover percent.
    pub cloud_property: &'a str,
    /// Maximum admissible cloud cover percent.
    pub max_cloud_pct: f64,
    /// Closed `[lon, lat]` ring the collection must intersect.
    pub region: &'a [[f64; 2]],
}

/// Visualization parameters for a true-color thumbnail.
#[derive(Debug, Clone)]
pub struct VisParams<'a> {
    /// Bands mapped to red, green, blue.
    pub bands: [&'a str; 3],
    /// Linear stretch minimum.
    pub min: f64,
    /// Linear stretch maximum.
    pub max: f64,
    /// Gamma correction.
    pub gamma: f64,
    /// Output width/height in pixels.
    pub dimensions: u32,
}

/// Area-weighted mean of one band of a single image over a region.
#[derive(Debug, Clone)]
pub struct ImageMeanRequest<'a> {
    /// Image asset id.
    pub image: &'a str,
    /// Band to reduce.
    pub band: &'a str,
    /// Closed `[lon, lat]` ring to reduce over.
    pub region: &'a [[f64; 2]],
    /// Nominal reduction scale in meters.
    pub scale_m: f64,
}

/// Temporal reduction of a collection band followed by a regional mean.
#[derive(Debug, Clone)]
pub struct CollectionMeanRequest<'a> {
    /// Collection asset id.
    pub collection: &'a str,
    /// Band to reduce.
    pub band: &'a str,
    /// Window start (inclusive).
    pub start_date: NaiveDate,
    /// Window end (exclusive).
    pub end_date: NaiveDate,
    /// Time-axis reduction applied before the regional mean.
    pub temporal: TemporalReducer,
    /// Closed `[lon, lat]` ring to reduce over.
    pub region: &'a [[f64; 2]],
    /// Nominal reduction scale in meters.
    pub scale_m: f64,
}

/// Per-image normalized difference, temporal mean, then regional mean.
#[derive(Debug, Clone)]
pub struct IndexMeanRequest<'a> {
    /// Collection asset id.
    pub collection: &'a str,
    /// Near-infrared band.
    pub nir_band: &'a str,
    /// Red band.
    pub red_band: &'a str,
    /// Window start (inclusive).
    pub start_date: NaiveDate,
    /// Window end (exclusive).
    pub end_date: NaiveDate,
    /// Metadata property holding per-image cloud cover percent.
    pub cloud_property: &'a str,
    /// Maximum admissible cloud cover percent.
    pub max_cloud_pct: f64,
    /// Closed `[lon, lat]` ring to reduce over.
    pub region: &'a [[f64; 2]],
    /// Nominal reduction scale in meters.
    pub scale_m: f64,
}

/// The raster operations the signal fetchers are built on.
///
/// A regional reduction returning `Ok(None)` means the engine answered
/// but had no data for the region — distinct from an [`EngineError`],
/// though the fetchers treat both as an unavailable signal.
#[async_trait::async_trait]
pub trait RasterEngine: Send + Sync {
    /// Band names of the median composite; empty means no image in the
    /// filtered collection covered the region.
    async fn composite_bands(&self, req: &CompositeRequest<'_>) -> Result<Vec<String>, EngineError>;

    /// Renders the median composite clipped to `frame` as a thumbnail
    /// and returns its URL.
    async fn composite_thumbnail(
        &self,
        req: &CompositeRequest<'_>,
        vis: &VisParams<'_>,
        frame: &[[f64; 2]],
    ) -> Result<String, EngineError>;

    /// Area-weighted mean of a single image band over the region.
    async fn image_band_mean(&self, req: &ImageMeanRequest<'_>)
    -> Result<Option<f64>, EngineError>;

    /// Temporal reduction of a collection band, then regional mean.
    async fn collection_band_mean(
        &self,
        req: &CollectionMeanRequest<'_>,
    ) -> Result<Option<f64>, EngineError>;

    /// Mean normalized difference of two bands over region and window.
    async fn normalized_difference_mean(
        &self,
        req: &IndexMeanRequest<'_>,
    ) -> Result<Option<f64>, EngineError>;
}
