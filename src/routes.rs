use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{
    generate_handler, health_handler, metrics_handler, panic_response, root_handler,
};
use crate::state::AppState;

// any origin, method and header
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/openai/generate_response", post(generate_handler))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer())
        .with_state(state)
}
