//! Topsoil chemistry fetcher.
//!
//! Reduces the SoilGrids pH and organic carbon rasters over the field
//! polygon at their native 250 m resolution. Both layers store values
//! scaled by 10, so the reduced means are de-scaled before use. The
//! soil signal is atomic: a field with a pH mean but no carbon mean is
//! still unavailable.

use agromap_geometry::RegionGeometry;
use agromap_signal_models::{SignalOutcome, SignalTier, SoilSample};

use crate::engine::{ImageMeanRequest, RasterEngine};

/// SoilGrids topsoil pH (in water) raster.
pub const PH_IMAGE: &str = "projects/soilgrids-isric/phh2o_mean";
/// Topsoil depth band, 0–5 cm.
const PH_BAND: &str = "phh2o_0-5cm_mean";
/// SoilGrids topsoil organic carbon raster.
pub const CARBON_IMAGE: &str = "projects/soilgrids-isric/soc_mean";
const CARBON_BAND: &str = "soc_0-5cm_mean";
/// Native dataset resolution in meters.
const SCALE_M: f64 = 250.0;
/// The stored values are value × 10.
const DECIMAL_FACTOR: f64 = 10.0;

/// Fetches the area-weighted mean topsoil chemistry for the field.
pub async fn fetch(engine: &dyn RasterEngine, region: &RegionGeometry) -> SignalOutcome<SoilSample> {
    let ph_request = ImageMeanRequest {
        image: PH_IMAGE,
        band: PH_BAND,
        region: region.ring(),
        scale_m: SCALE_M,
    };
    let carbon_request = ImageMeanRequest {
        image: CARBON_IMAGE,
        band: CARBON_BAND,
        region: region.ring(),
        scale_m: SCALE_M,
    };

    let (ph, carbon) = tokio::join!(
        engine.image_band_mean(&ph_request),
        engine.image_band_mean(&carbon_request),
    );

    let ph = match ph {
        Ok(value) => value,
        Err(e) => return SignalOutcome::unavailable(format!("pH reduction failed: {e}")),
    };
    let carbon = match carbon {
        Ok(value) => value,
        Err(e) => return SignalOutcome::unavailable(format!("carbon reduction failed: {e}")),
    };

    match (ph, carbon) {
        (Some(ph), Some(carbon)) => SignalOutcome::available(
            SoilSample {
                ph: ph / DECIMAL_FACTOR,
                organic_carbon_pct: carbon / DECIMAL_FACTOR,
            },
            SignalTier::Primary,
        ),
        _ => SignalOutcome::unavailable("soil chemistry not covered at this location"),
    }
}
