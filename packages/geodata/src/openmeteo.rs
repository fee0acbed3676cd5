//! Open-Meteo historical climate client.
//!
//! Used as the climate fallback when the raster engine cannot reduce
//! the precipitation and temperature collections over the polygon.
//! Queries the ERA5-backed archive API for daily values over a date
//! range and reduces them to annual normals: the daily mean
//! temperatures are averaged, the daily precipitation totals are
//! summed.
//!
//! See <https://open-meteo.com/en/docs/historical-weather-api>

use agromap_signal_models::ClimateNormals;

use crate::GeodataError;

/// Queries annual climate normals at a point for the given date range
/// (inclusive, `YYYY-MM-DD`).
///
/// Returns `Ok(None)` when the service responds without usable daily
/// series — both quantities are required.
///
/// # Errors
///
/// Returns [`GeodataError`] if the HTTP request or response parsing
/// fails, or the request exceeds `timeout`.
pub async fn point_normals(
    client: &reqwest::Client,
    base_url: &str,
    lat: f64,
    lon: f64,
    start_date: &str,
    end_date: &str,
    timeout: std::time::Duration,
) -> Result<Option<ClimateNormals>, GeodataError> {
    let url = format!("{base_url}/v1/archive");
    let resp = client
        .get(&url)
        .timeout(timeout)
        .query(&[
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("start_date", start_date.to_string()),
            ("end_date", end_date.to_string()),
            (
                "daily",
                "temperature_2m_mean,precipitation_sum".to_string(),
            ),
            ("timezone", "UTC".to_string()),
        ])
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeodataError::RateLimited);
    }

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses the archive response into [`ClimateNormals`].
fn parse_response(body: &serde_json::Value) -> Result<Option<ClimateNormals>, GeodataError> {
    let daily = body["daily"].as_object().ok_or_else(|| GeodataError::Parse {
        message: "Open-Meteo response has no daily block".to_string(),
    })?;

    let temps = numeric_series(daily.get("temperature_2m_mean"));
    let rains = numeric_series(daily.get("precipitation_sum"));

    if temps.is_empty() || rains.is_empty() {
        return Ok(None);
    }

    #[allow(clippy::cast_precision_loss)]
    let mean_temp_c = temps.iter().sum::<f64>() / temps.len() as f64;
    let rainfall_mm_per_year = rains.iter().sum();

    Ok(Some(ClimateNormals {
        rainfall_mm_per_year,
        mean_temp_c,
    }))
}

/// Collects the non-null numeric entries of a daily series.
fn numeric_series(value: Option<&serde_json::Value>) -> Vec<f64> {
    value
        .and_then(serde_json::Value::as_array)
        .map(|entries| entries.iter().filter_map(serde_json::Value::as_f64).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_daily_series_into_normals() {
        let body = serde_json::json!({
            "daily": {
                "time": ["2024-01-01", "2024-01-02", "2024-01-03"],
                "temperature_2m_mean": [26.0, 28.0, 27.0],
                "precipitation_sum": [0.0, 12.5, 3.5]
            }
        });
        let normals = parse_response(&body).unwrap().unwrap();
        assert!((normals.mean_temp_c - 27.0).abs() < 1e-9);
        assert!((normals.rainfall_mm_per_year - 16.0).abs() < 1e-9);
    }

    #[test]
    fn null_entries_are_skipped() {
        let body = serde_json::json!({
            "daily": {
                "temperature_2m_mean": [26.0, null, 28.0],
                "precipitation_sum": [1.0, null, 2.0]
            }
        });
        let normals = parse_response(&body).unwrap().unwrap();
        assert!((normals.mean_temp_c - 27.0).abs() < 1e-9);
        assert!((normals.rainfall_mm_per_year - 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_series_yields_none() {
        let body = serde_json::json!({
            "daily": { "temperature_2m_mean": [], "precipitation_sum": [] }
        });
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn missing_daily_block_is_a_parse_error() {
        let err = parse_response(&serde_json::json!({ "hourly": {} })).unwrap_err();
        assert!(matches!(err, GeodataError::Parse { .. }));
    }
}
