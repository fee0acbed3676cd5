//! Aggregation pipeline: one request in, one complete report out.
//!
//! Runs the four signal resolutions concurrently — they have no data
//! dependency on each other, and the fan-out is naturally bounded at
//! the four signals — and joins them into a [`FieldReport`]. The only
//! failures that escape are geometry construction errors; everything a
//! remote service can do wrong is absorbed by the resolver tiers.

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use agromap_geodata::service_registry::{self, FallbackService, ProviderConfig};
use agromap_geodata::{nominatim, openmeteo, soilgrids};
use agromap_geometry::{FieldPolygon, GeometryError, RegionGeometry};
use agromap_signal_models::{
    ClimateNormals, FieldSignals, Resolved, SignalOutcome, SignalTier, SoilSample, defaults,
};
use chrono::Utc;
use thiserror::Error;

use crate::engine::RasterEngine;
use crate::{climate, imagery, resolver, soil, vegetation};

/// Ceiling on one signal's whole resolution (both remote tiers). Past
/// it the signal falls to the default tier and the late result is
/// discarded.
const SIGNAL_DEADLINE: Duration = Duration::from_secs(30);

/// Errors from the aggregation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The polygon could not be turned into engine geometry.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// The secondary providers available to the resolver, selected from the
/// embedded service registry.
#[derive(Debug, Default)]
pub struct FallbackRegistry {
    /// Point soil chemistry provider.
    pub soilgrids: Option<FallbackService>,
    /// Point climate archive provider.
    pub openmeteo: Option<FallbackService>,
    /// Reverse geocoder for the display-only region name.
    pub nominatim: Option<FallbackService>,
}

impl FallbackRegistry {
    /// Buckets a service list by provider kind.
    #[must_use]
    pub fn from_services(services: Vec<FallbackService>) -> Self {
        let mut registry = Self::default();
        for service in services {
            match service.provider {
                ProviderConfig::SoilGrids { .. } => registry.soilgrids = Some(service),
                ProviderConfig::OpenMeteo { .. } => registry.openmeteo = Some(service),
                ProviderConfig::Nominatim { .. } => registry.nominatim = Some(service),
            }
        }
        registry
    }

    /// The registry built from the enabled embedded services.
    #[must_use]
    pub fn standard() -> Self {
        Self::from_services(service_registry::enabled_services())
    }
}

/// A complete, fully resolved report for one field polygon.
#[derive(Debug, Clone)]
pub struct FieldReport {
    /// The resolved signals with their source tiers.
    pub signals: FieldSignals,
    /// Geodesic polygon area, m².
    pub area_sq_m: f64,
    /// Display-only administrative region name, when the reverse
    /// geocoder had one.
    pub admin_area: Option<String>,
}

/// The aggregation orchestrator.
pub struct SignalPipeline {
    engine: Arc<dyn RasterEngine>,
    http: reqwest::Client,
    registry: FallbackRegistry,
}

impl SignalPipeline {
    /// Creates a pipeline over the given engine and fallback registry.
    #[must_use]
    pub fn new(engine: Arc<dyn RasterEngine>, registry: FallbackRegistry) -> Self {
        Self {
            engine,
            http: reqwest::Client::new(),
            registry,
        }
    }

    /// Resolves all four signals for the polygon and assembles the
    /// report.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] only when the polygon cannot be turned
    /// into engine geometry — a client-input condition. Signal
    /// unavailability never surfaces here.
    pub async fn aggregate(&self, polygon: &FieldPolygon) -> Result<FieldReport, PipelineError> {
        let region = RegionGeometry::from_polygon(polygon)?;
        let (lat, lon) = polygon.representative_point();

        let (imagery, soil, climate, vegetation_index, admin_area) = tokio::join!(
            self.resolve_imagery(&region),
            self.resolve_soil(&region, lat, lon),
            self.resolve_climate(&region, lat, lon),
            self.resolve_vegetation(&region),
            self.admin_area(lat, lon),
        );

        log::info!(
            "field report: area={:.1} m², imagery[{}], pH={:.2}[{}], carbon={:.2}%[{}], rain={:.0} mm[{}], temp={:.1} °C[{}], ndvi={:.2}[{}]",
            region.area_sq_m(),
            imagery.source,
            soil.value.ph,
            soil.source,
            soil.value.organic_carbon_pct,
            soil.source,
            climate.value.rainfall_mm_per_year,
            climate.source,
            climate.value.mean_temp_c,
            climate.source,
            vegetation_index.value,
            vegetation_index.source,
        );

        Ok(FieldReport {
            signals: FieldSignals {
                imagery,
                soil,
                climate,
                vegetation_index,
            },
            area_sq_m: region.area_sq_m(),
            admin_area,
        })
    }

    async fn resolve_imagery(&self, region: &RegionGeometry) -> Resolved<String> {
        // No point-based secondary exists for imagery.
        let primary = imagery::fetch(self.engine.as_ref(), region);
        let resolution = resolver::resolve(
            "imagery",
            primary,
            None::<std::future::Ready<SignalOutcome<String>>>,
            defaults::IMAGE_URL.to_string(),
        );
        with_deadline("imagery", resolution, || defaults::IMAGE_URL.to_string()).await
    }

    async fn resolve_soil(&self, region: &RegionGeometry, lat: f64, lon: f64) -> Resolved<SoilSample> {
        let primary = soil::fetch(self.engine.as_ref(), region);
        let secondary = self.registry.soilgrids.as_ref().map(|service| async move {
            let timeout = Duration::from_secs(service.timeout_secs);
            match soilgrids::point_sample(&self.http, service.base_url(), lat, lon, timeout).await {
                Ok(Some(sample)) => SignalOutcome::available(sample, SignalTier::Secondary),
                Ok(None) => SignalOutcome::unavailable("no point sample at this location"),
                Err(e) => SignalOutcome::unavailable(format!("point query failed: {e}")),
            }
        });
        let resolution = resolver::resolve("soil", primary, secondary, defaults::soil());
        with_deadline("soil", resolution, defaults::soil).await
    }

    async fn resolve_climate(
        &self,
        region: &RegionGeometry,
        lat: f64,
        lon: f64,
    ) -> Resolved<ClimateNormals> {
        let primary = climate::fetch(self.engine.as_ref(), region);
        let secondary = self.registry.openmeteo.as_ref().map(|service| async move {
            let timeout = Duration::from_secs(service.timeout_secs);
            let (start, end) = fallback_window();
            match openmeteo::point_normals(
                &self.http,
                service.base_url(),
                lat,
                lon,
                &start,
                &end,
                timeout,
            )
            .await
            {
                Ok(Some(normals)) => SignalOutcome::available(normals, SignalTier::Secondary),
                Ok(None) => SignalOutcome::unavailable("no archive series at this location"),
                Err(e) => SignalOutcome::unavailable(format!("archive query failed: {e}")),
            }
        });
        let resolution = resolver::resolve("climate", primary, secondary, defaults::climate());
        with_deadline("climate", resolution, defaults::climate).await
    }

    async fn resolve_vegetation(&self, region: &RegionGeometry) -> Resolved<f64> {
        // The NDVI fallback is the static constant itself.
        let primary = vegetation::fetch(self.engine.as_ref(), region);
        let resolution = resolver::resolve(
            "ndvi",
            primary,
            None::<std::future::Ready<SignalOutcome<f64>>>,
            defaults::NDVI,
        );
        with_deadline("ndvi", resolution, || defaults::NDVI).await
    }

    /// Display-only reverse geocode of the representative point.
    async fn admin_area(&self, lat: f64, lon: f64) -> Option<String> {
        let service = self.registry.nominatim.as_ref()?;
        let timeout = Duration::from_secs(service.timeout_secs);
        match nominatim::region_name(&self.http, service.base_url(), lat, lon, timeout).await {
            Ok(name) => name,
            Err(e) => {
                log::debug!("reverse geocoding failed: {e}");
                None
            }
        }
    }
}

/// The trailing full year the climate fallback asks the archive for,
/// offset a week back for the archive's ingest delay.
fn fallback_window() -> (String, String) {
    let end = Utc::now().date_naive() - chrono::Duration::days(7);
    let start = end - chrono::Duration::days(364);
    (start.to_string(), end.to_string())
}

/// Caps a resolution at [`SIGNAL_DEADLINE`], substituting the default
/// tier on expiry.
async fn with_deadline<T: Debug>(
    signal: &str,
    resolution: impl Future<Output = Resolved<T>>,
    default_value: impl FnOnce() -> T,
) -> Resolved<T> {
    match tokio::time::timeout(SIGNAL_DEADLINE, resolution).await {
        Ok(resolved) => resolved,
        Err(_) => {
            log::warn!("{signal}: resolution deadline exceeded, substituting default");
            Resolved {
                value: default_value(),
                source: SignalTier::Default,
            }
        }
    }
}
