//! HTTP handler functions for the agromap API.

use actix_web::{HttpResponse, web};
use agromap_geometry::FieldPolygon;
use agromap_prediction::PredictionError;
use agromap_prediction::features::{FarmMetadata, SignalReadings};
use agromap_server_models::{
    ApiHealth, CalculateRequest, CalculateResponse, ChatRequest, ChatResponse, PredictRequest,
    PredictResponse, SignalSources,
};
use agromap_signals::pipeline::FieldReport;

use crate::AppState;

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /calculate`
///
/// Validates the polygon, runs the signal pipeline, and returns the
/// complete report. Signal unavailability never fails this endpoint —
/// the fallback tiers have already absorbed it.
pub async fn calculate(
    state: web::Data<AppState>,
    body: web::Json<CalculateRequest>,
) -> HttpResponse {
    let polygon = match FieldPolygon::new(body.polygon.clone()) {
        Ok(polygon) => polygon,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": e.to_string()
            }));
        }
    };

    match state.pipeline.aggregate(&polygon).await {
        Ok(report) => HttpResponse::Ok().json(to_calculate_response(report, &body.polygon)),
        Err(e) => {
            log::error!("Geospatial processing failed: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Geospatial processing failed"
            }))
        }
    }
}

/// Builds the wire response from a resolved report.
fn to_calculate_response(report: FieldReport, polygon_bounds: &[[f64; 2]]) -> CalculateResponse {
    let signals = report.signals;
    CalculateResponse {
        status: "success".to_string(),
        area_sq_m: report.area_sq_m,
        image_tile_url: signals.imagery.value,
        rainfall_total_mm: signals.climate.value.rainfall_mm_per_year,
        avg_temp_c: signals.climate.value.mean_temp_c,
        soil_ph: signals.soil.value.ph,
        ndvi_mean: signals.vegetation_index.value,
        soil_org_carbon_pct: signals.soil.value.organic_carbon_pct,
        polygon_bounds: polygon_bounds.to_vec(),
        state: report.admin_area,
        sources: SignalSources {
            imagery: signals.imagery.source,
            soil: signals.soil.source,
            climate: signals.climate.source,
            ndvi: signals.vegetation_index.source,
        },
    }
}

/// `POST /predict`
///
/// Encodes the categorical state, assembles the feature vector, and
/// decodes the classifier's label to a crop name.
pub async fn predict(state: web::Data<AppState>, body: web::Json<PredictRequest>) -> HttpResponse {
    let readings = SignalReadings {
        rainfall_total_mm: body.rainfall_total_mm,
        avg_temp_c: body.avg_temp_c,
        ndvi_mean: body.ndvi_mean,
        soil_ph: body.soil_ph,
        soil_org_carbon_pct: body.soil_org_carbon_pct,
    };
    let metadata = FarmMetadata {
        state: body.state.clone(),
        fertilizer_rate_kg_per_ha: body.fertilizer_rate_kg_per_ha,
        pesticide_rate_l_per_ha: body.pesticide_rate_l_per_ha,
        farm_size_ha: body.farm_size_ha,
        irrigated_area_ha: body.irrigated_area_ha,
    };

    match state.predictor.recommend(&readings, &metadata) {
        Ok(crop) => HttpResponse::Ok().json(PredictResponse {
            status: "success".to_string(),
            predicted_crop: crop.to_string(),
        }),
        Err(e @ PredictionError::UnknownCategory { .. }) => {
            log::warn!("Prediction rejected: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Prediction failed: {e}")
            }))
        }
        Err(e) => {
            log::error!("Prediction failed: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Prediction failed"
            }))
        }
    }
}

/// `POST /chat`
///
/// Always answers 200; degraded states are communicated in the
/// response text by the advisory service.
pub async fn chat(state: web::Data<AppState>, body: web::Json<ChatRequest>) -> HttpResponse {
    let session_id = body
        .session_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let response = state
        .advisor
        .answer(&session_id, &body.message, &body.info)
        .await;

    HttpResponse::Ok().json(ChatResponse {
        response,
        session_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};
    use agromap_advisor::{AdvisoryService, OFFLINE_RESPONSE};
    use agromap_prediction::Predictor;
    use agromap_prediction::model::ForestModel;
    use agromap_signals::engine::{
        CollectionMeanRequest, CompositeRequest, EngineError, ImageMeanRequest, IndexMeanRequest,
        RasterEngine, VisParams,
    };
    use agromap_signals::pipeline::{FallbackRegistry, SignalPipeline};
    use std::sync::Arc;

    /// One tree that always answers Maize.
    const MODEL_FIXTURE: &str = r#"{
        "classes": 10,
        "trees": [{ "nodes": [{ "leaf": 3 }] }]
    }"#;

    /// An engine that fails every call, as if the service were down.
    struct DownEngine;

    #[async_trait::async_trait]
    impl RasterEngine for DownEngine {
        async fn composite_bands(
            &self,
            _req: &CompositeRequest<'_>,
        ) -> Result<Vec<String>, EngineError> {
            Err(EngineError::Rejected {
                message: "down".to_string(),
            })
        }

        async fn composite_thumbnail(
            &self,
            _req: &CompositeRequest<'_>,
            _vis: &VisParams<'_>,
            _frame: &[[f64; 2]],
        ) -> Result<String, EngineError> {
            Err(EngineError::Rejected {
                message: "down".to_string(),
            })
        }

        async fn image_band_mean(
            &self,
            _req: &ImageMeanRequest<'_>,
        ) -> Result<Option<f64>, EngineError> {
            Err(EngineError::Rejected {
                message: "down".to_string(),
            })
        }

        async fn collection_band_mean(
            &self,
            _req: &CollectionMeanRequest<'_>,
        ) -> Result<Option<f64>, EngineError> {
            Err(EngineError::Rejected {
                message: "down".to_string(),
            })
        }

        async fn normalized_difference_mean(
            &self,
            _req: &IndexMeanRequest<'_>,
        ) -> Result<Option<f64>, EngineError> {
            Err(EngineError::Rejected {
                message: "down".to_string(),
            })
        }
    }

    /// An engine that must never be reached.
    struct PanicEngine;

    #[async_trait::async_trait]
    impl RasterEngine for PanicEngine {
        async fn composite_bands(
            &self,
            _req: &CompositeRequest<'_>,
        ) -> Result<Vec<String>, EngineError> {
            panic!("remote call attempted");
        }

        async fn composite_thumbnail(
            &self,
            _req: &CompositeRequest<'_>,
            _vis: &VisParams<'_>,
            _frame: &[[f64; 2]],
        ) -> Result<String, EngineError> {
            panic!("remote call attempted");
        }

        async fn image_band_mean(
            &self,
            _req: &ImageMeanRequest<'_>,
        ) -> Result<Option<f64>, EngineError> {
            panic!("remote call attempted");
        }

        async fn collection_band_mean(
            &self,
            _req: &CollectionMeanRequest<'_>,
        ) -> Result<Option<f64>, EngineError> {
            panic!("remote call attempted");
        }

        async fn normalized_difference_mean(
            &self,
            _req: &IndexMeanRequest<'_>,
        ) -> Result<Option<f64>, EngineError> {
            panic!("remote call attempted");
        }
    }

    fn test_state(engine: Arc<dyn RasterEngine>) -> web::Data<AppState> {
        let model = ForestModel::from_json(MODEL_FIXTURE).unwrap();
        web::Data::new(AppState {
            pipeline: Arc::new(SignalPipeline::new(engine, FallbackRegistry::default())),
            predictor: Arc::new(Predictor::new(Box::new(model))),
            advisor: Arc::new(AdvisoryService::new(None)),
        })
    }

    fn predict_body(state_name: &str) -> serde_json::Value {
        serde_json::json!({
            "state": state_name,
            "rainfall_total_mm": 1100.0,
            "avg_temp_c": 27.5,
            "ndvi_mean": 0.5,
            "soil_ph": 6.4,
            "soil_org_carbon_pct": 1.1,
            "fertilizer_rate_kg_per_ha": 100.0,
            "pesticide_rate_l_per_ha": 2.0,
            "farm_size_ha": 3.0,
            "irrigated_area_ha": 0.5
        })
    }

    #[actix_web::test]
    async fn short_polygon_is_rejected_before_any_remote_call() {
        let app = test::init_service(
            App::new()
                .app_data(test_state(Arc::new(PanicEngine)))
                .route("/calculate", web::post().to(calculate)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/calculate")
            .set_json(serde_json::json!({ "polygon": [[12.0, 8.5], [12.1, 8.5]] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn calculate_degrades_to_defaults_when_every_provider_is_down() {
        let app = test::init_service(
            App::new()
                .app_data(test_state(Arc::new(DownEngine)))
                .route("/calculate", web::post().to(calculate)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/calculate")
            .set_json(serde_json::json!({
                "polygon": [[12.0, 8.5], [12.0, 8.51], [12.01, 8.51]]
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "success");
        assert_eq!(body["soil_pH"], 6.5);
        assert_eq!(body["soil_org_carbon_pct"], 1.2);
        assert_eq!(body["avg_temp_c"], 27.0);
        assert_eq!(body["rainfall_total_mm"], 1200.0);
        assert_eq!(body["ndvi_mean"], 0.45);
        assert!(
            body["image_tile_url"]
                .as_str()
                .unwrap()
                .contains("placeholder")
        );
        assert!(body["area_sq_m"].as_f64().unwrap() > 0.0);
        assert_eq!(body["sources"]["soil"], "default");
        assert_eq!(body["polygon_bounds"][0][0], 12.0);
    }

    #[actix_web::test]
    async fn unknown_state_yields_a_category_error() {
        let app = test::init_service(
            App::new()
                .app_data(test_state(Arc::new(PanicEngine)))
                .route("/predict", web::post().to(predict)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(predict_body("Narnia"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .contains("unknown category")
        );
    }

    #[actix_web::test]
    async fn predict_decodes_the_crop_name() {
        let app = test::init_service(
            App::new()
                .app_data(test_state(Arc::new(PanicEngine)))
                .route("/predict", web::post().to(predict)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(predict_body("Kano"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["predicted_crop"], "Maize");
    }

    #[actix_web::test]
    async fn chat_answers_offline_without_a_provider() {
        let app = test::init_service(
            App::new()
                .app_data(test_state(Arc::new(PanicEngine)))
                .route("/chat", web::post().to(chat)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/chat")
            .set_json(serde_json::json!({
                "message": "What should I plant?",
                "info": { "state": "Kano" }
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["response"], OFFLINE_RESPONSE);
        assert!(!body["session_id"].as_str().unwrap().is_empty());
    }
}
