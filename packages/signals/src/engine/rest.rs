//! REST implementation of the raster engine interface.
//!
//! Speaks the engine's expression API: every operation is encoded as a
//! nested expression tree of function invocations over constants, sent
//! to the `value:compute` endpoint; thumbnails go through the
//! `thumbnails` endpoint, which registers the render and hands back a
//! name from which the pixel URL is derived.

use serde_json::{Value, json};

use super::{
    CollectionMeanRequest, CompositeRequest, EngineError, ImageMeanRequest, IndexMeanRequest,
    RasterEngine, TemporalReducer, VisParams,
};

/// Raster engine client over the hosted REST API.
pub struct RestEngine {
    client: reqwest::Client,
    base_url: String,
    project: String,
    token: String,
}

impl RestEngine {
    /// Creates a client for the given project using an already-issued
    /// bearer token.
    #[must_use]
    pub fn new(base_url: String, project: String, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            project,
            token,
        }
    }

    /// Evaluates an expression tree and returns the `result` payload.
    async fn compute(&self, expression: Value) -> Result<Value, EngineError> {
        let url = format!(
            "{}/v1/projects/{}/value:compute",
            self.base_url, self.project
        );
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "expression": expression }))
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(EngineError::Unauthorized);
        }

        let body = resp.text().await?;
        if !status.is_success() {
            return Err(EngineError::Rejected {
                message: error_message(&body, status),
            });
        }

        let parsed: Value = serde_json::from_str(&body).map_err(|e| EngineError::Parse {
            message: format!("invalid compute response: {e}"),
        })?;
        Ok(parsed["result"].clone())
    }

    /// Registers a thumbnail render and returns its pixel URL.
    async fn thumbnail(&self, expression: Value, dimensions: u32) -> Result<String, EngineError> {
        let url = format!("{}/v1/projects/{}/thumbnails", self.base_url, self.project);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({
                "expression": expression,
                "fileFormat": "PNG",
                "grid": { "dimensions": { "width": dimensions, "height": dimensions } },
            }))
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(EngineError::Unauthorized);
        }

        let body = resp.text().await?;
        if !status.is_success() {
            return Err(EngineError::Rejected {
                message: error_message(&body, status),
            });
        }

        let parsed: Value = serde_json::from_str(&body).map_err(|e| EngineError::Parse {
            message: format!("invalid thumbnail response: {e}"),
        })?;
        let name = parsed["name"].as_str().ok_or_else(|| EngineError::Parse {
            message: "thumbnail response has no name".to_string(),
        })?;
        Ok(format!("{}/v1/{name}:getPixels", self.base_url))
    }

    /// The filtered median composite shared by the imagery operations.
    fn composite_expr(req: &CompositeRequest<'_>) -> Value {
        let collection = filter_cloud(
            filter_bounds(
                filter_date(
                    load_collection(req.collection),
                    req.start_date.to_string().as_str(),
                    req.end_date.to_string().as_str(),
                ),
                req.region,
            ),
            req.cloud_property,
            req.max_cloud_pct,
        );
        median(collection)
    }
}

#[async_trait::async_trait]
impl RasterEngine for RestEngine {
    async fn composite_bands(&self, req: &CompositeRequest<'_>) -> Result<Vec<String>, EngineError> {
        let expr = invoke("Image.bandNames", json!({ "image": Self::composite_expr(req) }));
        let result = self.compute(expr).await?;
        parse_band_names(&result)
    }

    async fn composite_thumbnail(
        &self,
        req: &CompositeRequest<'_>,
        vis: &VisParams<'_>,
        frame: &[[f64; 2]],
    ) -> Result<String, EngineError> {
        let clipped = invoke(
            "Image.clip",
            json!({
                "input": Self::composite_expr(req),
                "geometry": polygon(frame),
            }),
        );
        let visualized = invoke(
            "Image.visualize",
            json!({
                "image": clipped,
                "bands": constant(json!(vis.bands)),
                "min": constant(json!(vis.min)),
                "max": constant(json!(vis.max)),
                "gamma": constant(json!(vis.gamma)),
            }),
        );
        self.thumbnail(visualized, vis.dimensions).await
    }

    async fn image_band_mean(
        &self,
        req: &ImageMeanRequest<'_>,
    ) -> Result<Option<f64>, EngineError> {
        let image = invoke(
            "Image.select",
            json!({
                "input": invoke("Image.load", json!({ "id": constant(json!(req.image)) })),
                "bandSelectors": constant(json!([req.band])),
            }),
        );
        let expr = reduce_region_mean(image, req.region, req.scale_m);
        let result = self.compute(expr).await?;
        Ok(parse_region_mean(&result))
    }

    async fn collection_band_mean(
        &self,
        req: &CollectionMeanRequest<'_>,
    ) -> Result<Option<f64>, EngineError> {
        let collection = invoke(
            "Collection.select",
            json!({
                "collection": filter_date(
                    load_collection(req.collection),
                    req.start_date.to_string().as_str(),
                    req.end_date.to_string().as_str(),
                ),
                "bandSelectors": constant(json!([req.band])),
            }),
        );
        let reducer = match req.temporal {
            TemporalReducer::Sum => "Reducer.sum",
            TemporalReducer::Mean => "Reducer.mean",
        };
        let reduced = invoke(
            "Collection.reduce",
            json!({
                "collection": collection,
                "reducer": invoke(reducer, json!({})),
            }),
        );
        let expr = reduce_region_mean(reduced, req.region, req.scale_m);
        let result = self.compute(expr).await?;
        Ok(parse_region_mean(&result))
    }

    async fn normalized_difference_mean(
        &self,
        req: &IndexMeanRequest<'_>,
    ) -> Result<Option<f64>, EngineError> {
        let collection = filter_cloud(
            filter_bounds(
                filter_date(
                    load_collection(req.collection),
                    req.start_date.to_string().as_str(),
                    req.end_date.to_string().as_str(),
                ),
                req.region,
            ),
            req.cloud_property,
            req.max_cloud_pct,
        );
        // Per-image index via a lambda, then the collection mean.
        let mapped = invoke(
            "Collection.map",
            json!({
                "collection": collection,
                "baseAlgorithm": {
                    "functionDefinitionValue": {
                        "argumentNames": ["image"],
                        "body": invoke(
                            "Image.normalizedDifference",
                            json!({
                                "input": { "argumentReference": "image" },
                                "bandNames": constant(json!([req.nir_band, req.red_band])),
                            }),
                        ),
                    }
                },
            }),
        );
        let temporal_mean = invoke(
            "Collection.reduce",
            json!({
                "collection": mapped,
                "reducer": invoke("Reducer.mean", json!({})),
            }),
        );
        let expr = reduce_region_mean(temporal_mean, req.region, req.scale_m);
        let result = self.compute(expr).await?;
        Ok(parse_region_mean(&result))
    }
}

// ── Expression tree builders ────────────────────────────────────────

fn constant(value: Value) -> Value {
    json!({ "constantValue": value })
}

fn invoke(function: &str, arguments: Value) -> Value {
    json!({
        "functionInvocationValue": {
            "functionName": function,
            "arguments": arguments,
        }
    })
}

fn polygon(ring: &[[f64; 2]]) -> Value {
    invoke(
        "GeometryConstructors.Polygon",
        json!({ "coordinates": constant(json!([ring])) }),
    )
}

fn load_collection(id: &str) -> Value {
    invoke("ImageCollection.load", json!({ "id": constant(json!(id)) }))
}

fn filter_date(collection: Value, start: &str, end: &str) -> Value {
    invoke(
        "Collection.filter",
        json!({
            "collection": collection,
            "filter": invoke(
                "Filter.date",
                json!({ "start": constant(json!(start)), "end": constant(json!(end)) }),
            ),
        }),
    )
}

fn filter_bounds(collection: Value, ring: &[[f64; 2]]) -> Value {
    invoke(
        "Collection.filter",
        json!({
            "collection": collection,
            "filter": invoke(
                "Filter.intersects",
                json!({
                    "leftField": constant(json!(".all")),
                    "rightValue": polygon(ring),
                }),
            ),
        }),
    )
}

fn filter_cloud(collection: Value, property: &str, max_pct: f64) -> Value {
    invoke(
        "Collection.filter",
        json!({
            "collection": collection,
            "filter": invoke(
                "Filter.lessThan",
                json!({
                    "leftField": constant(json!(property)),
                    "rightValue": constant(json!(max_pct)),
                }),
            ),
        }),
    )
}

fn median(collection: Value) -> Value {
    invoke(
        "Collection.reduce",
        json!({
            "collection": collection,
            "reducer": invoke("Reducer.median", json!({})),
        }),
    )
}

fn reduce_region_mean(image: Value, ring: &[[f64; 2]], scale_m: f64) -> Value {
    invoke(
        "Image.reduceRegion",
        json!({
            "image": image,
            "reducer": invoke("Reducer.mean", json!({})),
            "geometry": polygon(ring),
            "scale": constant(json!(scale_m)),
            "bestEffort": constant(json!(true)),
        }),
    )
}

// ── Response parsing ────────────────────────────────────────────────

/// Decodes the engine's error body, falling back to the raw status.
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| format!("HTTP {status}: {body}"))
}

/// Parses a band-name listing.
fn parse_band_names(result: &Value) -> Result<Vec<String>, EngineError> {
    let names = result.as_array().ok_or_else(|| EngineError::Parse {
        message: "band name result is not an array".to_string(),
    })?;
    Ok(names
        .iter()
        .filter_map(|n| n.as_str().map(String::from))
        .collect())
}

/// Extracts the single reduced value from a region reduction result.
///
/// The result is keyed by output band name; a null or absent value
/// means the reduction found no unmasked pixels.
fn parse_region_mean(result: &Value) -> Option<f64> {
    result
        .as_object()
        .and_then(|map| map.values().find_map(Value::as_f64))
}
