//! ISRIC SoilGrids v2 point query client.
//!
//! Used as the soil-chemistry fallback when the raster engine cannot
//! reduce the SoilGrids layers over the polygon. Queries the topsoil
//! (0–5 cm) mean for pH and organic carbon at a single point.
//!
//! See <https://rest.isric.org/soilgrids/v2.0/docs>

use agromap_signal_models::SoilSample;

use crate::GeodataError;

/// Queries topsoil pH and organic carbon at a point.
///
/// Returns `Ok(None)` when the service responds but has no value for
/// either property at this location — the soil signal is atomic, so a
/// half-measured sample is treated as absent.
///
/// # Errors
///
/// Returns [`GeodataError`] if the HTTP request or response parsing
/// fails, or the request exceeds `timeout`.
pub async fn point_sample(
    client: &reqwest::Client,
    base_url: &str,
    lat: f64,
    lon: f64,
    timeout: std::time::Duration,
) -> Result<Option<SoilSample>, GeodataError> {
    let url = format!("{base_url}/soilgrids/v2.0/properties/query");
    let resp = client
        .get(&url)
        .timeout(timeout)
        .query(&[
            ("lon", lon.to_string()),
            ("lat", lat.to_string()),
            ("property", "phh2o".to_string()),
            ("property", "soc".to_string()),
            ("depth", "0-5cm".to_string()),
            ("value", "mean".to_string()),
        ])
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeodataError::RateLimited);
    }

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses the SoilGrids properties response into a [`SoilSample`].
fn parse_response(body: &serde_json::Value) -> Result<Option<SoilSample>, GeodataError> {
    let layers = body["properties"]["layers"]
        .as_array()
        .ok_or_else(|| GeodataError::Parse {
            message: "SoilGrids response has no properties.layers".to_string(),
        })?;

    let ph = layer_mean(layers, "phh2o").map(|raw| raw / 10.0);
    // soc arrives in dg/kg; percent is two decades down.
    let organic_carbon_pct = layer_mean(layers, "soc").map(|raw| raw / 100.0);

    match (ph, organic_carbon_pct) {
        (Some(ph), Some(organic_carbon_pct)) => Ok(Some(SoilSample {
            ph,
            organic_carbon_pct,
        })),
        _ => Ok(None),
    }
}

/// Extracts the first depth's mean for the named property layer.
fn layer_mean(layers: &[serde_json::Value], property: &str) -> Option<f64> {
    layers
        .iter()
        .find(|layer| layer["name"].as_str() == Some(property))
        .and_then(|layer| layer["depths"].as_array())
        .and_then(|depths| depths.first())
        .and_then(|depth| depth["values"]["mean"].as_f64())
}
