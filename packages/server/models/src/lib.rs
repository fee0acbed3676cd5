#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the agromap server.
//!
//! These types are serialized to JSON for the REST API. They are
//! separate from the internal pipeline types to allow independent
//! evolution of the API contract — in particular the legacy `soil_pH`
//! key casing, which existing consumers depend on.

use std::collections::BTreeMap;

use agromap_signal_models::SignalTier;
use serde::{Deserialize, Serialize};

/// Request body for `POST /calculate`.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculateRequest {
    /// Polygon vertices as `[lat, lon]` pairs, at least three.
    pub polygon: Vec<[f64; 2]>,
}

/// Response body for `POST /calculate`.
///
/// Every numeric field is always present and finite — fallback
/// resolution has already run by the time this is built.
#[derive(Debug, Clone, Serialize)]
pub struct CalculateResponse {
    /// Fixed `"success"` tag.
    pub status: String,
    /// Geodesic polygon area, m².
    pub area_sq_m: f64,
    /// True-color thumbnail URL.
    pub image_tile_url: String,
    /// Average annual total precipitation, mm.
    pub rainfall_total_mm: f64,
    /// Mean air temperature, °C.
    pub avg_temp_c: f64,
    /// Topsoil pH. The key casing is part of the published contract.
    #[serde(rename = "soil_pH")]
    pub soil_ph: f64,
    /// Mean vegetation index.
    pub ndvi_mean: f64,
    /// Topsoil organic carbon, percent.
    pub soil_org_carbon_pct: f64,
    /// The request's vertices, echoed back.
    pub polygon_bounds: Vec<[f64; 2]>,
    /// Administrative region of the field, when resolvable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Which fallback tier produced each signal (diagnostics).
    pub sources: SignalSources,
}

/// Per-signal source tiers exposed for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct SignalSources {
    /// Imagery tier.
    pub imagery: SignalTier,
    /// Soil chemistry tier.
    pub soil: SignalTier,
    /// Climate tier.
    pub climate: SignalTier,
    /// Vegetation index tier.
    pub ndvi: SignalTier,
}

/// Request body for `POST /predict`.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    /// State name, as trained.
    pub state: String,
    /// Average annual total precipitation, mm.
    pub rainfall_total_mm: f64,
    /// Mean air temperature, °C.
    pub avg_temp_c: f64,
    /// Mean vegetation index.
    pub ndvi_mean: f64,
    /// Topsoil pH.
    pub soil_ph: f64,
    /// Topsoil organic carbon, percent.
    pub soil_org_carbon_pct: f64,
    /// Fertilizer application rate, kg/ha.
    pub fertilizer_rate_kg_per_ha: f64,
    /// Pesticide application rate, L/ha.
    pub pesticide_rate_l_per_ha: f64,
    /// Total farm size, ha.
    pub farm_size_ha: f64,
    /// Irrigated area, ha.
    pub irrigated_area_ha: f64,
}

/// Response body for `POST /predict`.
#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    /// Fixed `"success"` tag.
    pub status: String,
    /// Recommended crop name.
    pub predicted_crop: String,
}

/// Request body for `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
    /// Structured farm profile forwarded to the advisor.
    #[serde(default)]
    pub info: BTreeMap<String, serde_json::Value>,
    /// Session to continue; a new one is created when absent.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response body for `POST /chat`. Always HTTP 200 — degradation is
/// communicated in `response` text.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    /// The advisor's answer (or a fixed degraded message).
    pub response: String,
    /// The session the exchange was recorded under.
    pub session_id: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soil_ph_serializes_with_the_legacy_casing() {
        let response = CalculateResponse {
            status: "success".to_string(),
            area_sq_m: 12_345.0,
            image_tile_url: "https://example.test/t.png".to_string(),
            rainfall_total_mm: 1200.0,
            avg_temp_c: 27.0,
            soil_ph: 6.5,
            ndvi_mean: 0.45,
            soil_org_carbon_pct: 1.2,
            polygon_bounds: vec![[12.0, 8.5], [12.0, 8.6], [12.1, 8.6]],
            state: None,
            sources: SignalSources {
                imagery: SignalTier::Default,
                soil: SignalTier::Default,
                climate: SignalTier::Default,
                ndvi: SignalTier::Default,
            },
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["soil_pH"], serde_json::json!(6.5));
        assert!(value.get("soil_ph").is_none());
        assert!(value.get("state").is_none());
    }

    #[test]
    fn chat_request_defaults() {
        let request: ChatRequest =
            serde_json::from_value(serde_json::json!({ "message": "hello" })).unwrap();
        assert!(request.info.is_empty());
        assert!(request.session_id.is_none());
    }
}
