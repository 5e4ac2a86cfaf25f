pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;

pub use config::AppConfig;
pub use error::ApiError;
pub use metrics::Metrics;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use ingest::DocumentExtractor;
use risk::{MacroDataSource, MacroRiskAnalyzer};
use scoring::{CompletionClient, ReportGenerator, Scorer};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::ServerConfig;

/// Shared, immutable service components. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub scorer: Scorer,
    pub reports: ReportGenerator,
    pub risk: MacroRiskAnalyzer,
    pub extractor: DocumentExtractor,
    pub metrics: Arc<Metrics>,
    pub llm_model: String,
}

impl AppState {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        macro_source: Option<Arc<dyn MacroDataSource>>,
        extractor: DocumentExtractor,
    ) -> Self {
        Self {
            scorer: Scorer::new(llm.clone()),
            reports: ReportGenerator::new(llm.clone()),
            risk: MacroRiskAnalyzer::new(llm.clone(), macro_source),
            extractor,
            metrics: Metrics::new(),
            llm_model: llm.model().to_string(),
        }
    }
}

pub fn build_router(state: AppState, server: &ServerConfig) -> Result<Router> {
    let router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/score", post(handlers::score))
        .route("/generate_analysis_report", post(handlers::generate_analysis_report))
        .route("/macro_risk_analysis", post(handlers::macro_risk_analysis))
        .route("/subjectivity", post(handlers::subjectivity))
        .route("/consistency", post(handlers::consistency))
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(cors_layer(&server.frontend_origin)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origin == "*" {
        return Ok(layer.allow_origin(Any));
    }

    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("Invalid FRONTEND_ORIGIN: {:?}", origin))?;
    Ok(layer.allow_origin(origin))
}
