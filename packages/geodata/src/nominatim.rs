//! Nominatim / OpenStreetMap reverse geocoding client.
//!
//! Resolves the polygon's representative point to an administrative
//! region name for display. Optional: the signal pipeline treats any
//! failure here as "no name", never as an error. Nominatim has strict
//! rate limits: **1 request per second** maximum.
//!
//! See <https://nominatim.org/release-docs/develop/api/Reverse/>

use crate::GeodataError;

/// Zoom level that resolves to state/region granularity.
const STATE_ZOOM: u8 = 5;

/// Reverse geocodes a point to its administrative region name.
///
/// The caller is responsible for rate limiting when issuing repeated
/// lookups against the public instance.
///
/// # Errors
///
/// Returns [`GeodataError`] if the HTTP request or response parsing
/// fails, or the request exceeds `timeout`.
pub async fn region_name(
    client: &reqwest::Client,
    base_url: &str,
    lat: f64,
    lon: f64,
    timeout: std::time::Duration,
) -> Result<Option<String>, GeodataError> {
    let url = format!("{base_url}/reverse");
    let resp = client
        .get(&url)
        .timeout(timeout)
        .query(&[
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("zoom", STATE_ZOOM.to_string()),
            ("format", "jsonv2".to_string()),
            ("addressdetails", "1".to_string()),
        ])
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeodataError::RateLimited);
    }

    let body: serde_json::Value = resp.json().await?;
    Ok(parse_response(&body))
}

/// Extracts the region name, preferring `state` over `region`.
fn parse_response(body: &serde_json::Value) -> Option<String> {
    let address = body["address"].as_object()?;
    address
        .get("state")
        .or_else(|| address.get("region"))
        .and_then(serde_json::Value::as_str)
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_state_over_region() {
        let body = serde_json::json!({
            "address": { "state": "Kano", "region": "North West" }
        });
        assert_eq!(parse_response(&body).as_deref(), Some("Kano"));
    }

    #[test]
    fn falls_back_to_region() {
        let body = serde_json::json!({
            "address": { "region": "North West" }
        });
        assert_eq!(parse_response(&body).as_deref(), Some("North West"));
    }

    #[test]
    fn unmatched_point_yields_none() {
        assert!(parse_response(&serde_json::json!({ "error": "Unable to geocode" })).is_none());
    }
}
