use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::handlers::HttpError;

// GET /metrics
pub async fn metrics_handler() -> Response {
    match crate::metrics::render() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            HttpError::Internal.into_response()
        }
    }
}
