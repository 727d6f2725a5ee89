use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{recommendations::DEFAULT_MAX_ATTEMPTS, RecommendationOrchestrator},
};

pub mod recommendations;

/// Bounds applied to client-supplied batch parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub default_batch_size: usize,
    pub max_batch_size: usize,
    pub default_max_attempts: u32,
    pub max_attempts_limit: u32,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            default_batch_size: 5,
            max_batch_size: 20,
            default_max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_attempts_limit: 30,
        }
    }
}

impl From<&Config> for RequestLimits {
    fn from(config: &Config) -> Self {
        Self {
            default_batch_size: config.default_batch_size,
            max_batch_size: config.max_batch_size,
            default_max_attempts: config.max_attempts,
            max_attempts_limit: config.max_attempts_limit,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub orchestrator: RecommendationOrchestrator,
    pub limits: RequestLimits,
}

impl AppState {
    pub fn new(orchestrator: RecommendationOrchestrator, limits: RequestLimits) -> Self {
        Self {
            orchestrator,
            limits,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(Arc::new(state))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recommendations", post(recommendations::recommend))
        .route("/recommendations/next", post(recommendations::next))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
