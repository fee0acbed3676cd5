#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the agromap backend.
//!
//! Serves the geospatial aggregation endpoint (`/calculate`), the crop
//! recommendation endpoint (`/predict`), and the advisory chat
//! (`/chat`). All process-wide initialization — raster engine client,
//! fallback registry, classifier artifact, advisory provider — happens
//! in [`run_server`] with explicit success or failure, not as
//! import-time side effects.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use agromap_advisor::AdvisoryService;
use agromap_advisor::providers::gemini::GeminiProvider;
use agromap_prediction::Predictor;
use agromap_signals::engine::rest::RestEngine;
use agromap_signals::pipeline::{FallbackRegistry, SignalPipeline};
use std::path::Path;

/// Default location of the persisted classifier artifact.
const DEFAULT_MODEL_PATH: &str = "model/crop_forest.json";
/// Default raster engine endpoint.
const DEFAULT_ENGINE_URL: &str = "https://earthengine.googleapis.com";

/// Shared application state.
pub struct AppState {
    /// Signal aggregation pipeline.
    pub pipeline: Arc<SignalPipeline>,
    /// Crop recommendation adapter.
    pub predictor: Arc<Predictor>,
    /// Advisory chat service.
    pub advisor: Arc<AdvisoryService>,
}

/// Starts the agromap API server.
///
/// Builds the raster engine client and fallback registry, loads the
/// classifier artifact, wires the advisory provider (offline when no
/// key is configured), and starts the Actix-Web HTTP server. This is a
/// regular async function — the caller provides the runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind
/// or encounters a runtime error.
///
/// # Panics
///
/// Panics if the engine credentials are missing or the classifier
/// artifact cannot be loaded — both are boot-time configuration
/// failures that should stop the process.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Configuring raster engine client...");
    let engine_url =
        std::env::var("ENGINE_BASE_URL").unwrap_or_else(|_| DEFAULT_ENGINE_URL.to_string());
    let engine_project =
        std::env::var("ENGINE_PROJECT").expect("ENGINE_PROJECT must be set");
    let engine_token = std::env::var("ENGINE_TOKEN").expect("ENGINE_TOKEN must be set");
    let engine = Arc::new(RestEngine::new(engine_url, engine_project, engine_token));

    log::info!("Loading fallback service registry...");
    let registry = FallbackRegistry::standard();
    let pipeline = Arc::new(SignalPipeline::new(engine, registry));

    log::info!("Loading crop model artifact...");
    let model_path =
        std::env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string());
    let predictor = Arc::new(
        Predictor::load(Path::new(&model_path)).expect("Failed to load crop model artifact"),
    );

    let advisor = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => {
            log::info!("Advisory provider configured");
            Arc::new(AdvisoryService::new(Some(Arc::new(GeminiProvider::new(
                key,
            )))))
        }
        _ => {
            log::warn!("GEMINI_API_KEY not set; advisory chat will answer offline");
            Arc::new(AdvisoryService::new(None))
        }
    };

    let state = web::Data::new(AppState {
        pipeline,
        predictor,
        advisor,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .route("/health", web::get().to(handlers::health))
            .route("/calculate", web::post().to(handlers::calculate))
            .route("/predict", web::post().to(handlers::predict))
            .route("/chat", web::post().to(handlers::chat))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
