use axum::body::Bytes;
use axum::{Json, extract::State};
use std::sync::Arc;
use std::time::Instant;

use crate::handlers::HttpError;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{GenerateResponse, PromptFields, PromptRequest};
use crate::state::AppState;

// POST /openai/generate_response
//
// The body is decoded here rather than through the `Json` extractor so that
// malformed input gets the same `{"detail": ...}` 400 as a failed validation.
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, HttpError> {
    REQUEST_TOTAL.inc();
    let start_time = Instant::now();

    let result = generate(&state, &body).await;

    // every outcome gets a latency sample, failures included
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    result.map(Json)
}

async fn generate(state: &AppState, body: &[u8]) -> Result<GenerateResponse, HttpError> {
    let fields = decode_fields(body).map_err(|detail| {
        tracing::error!(error = %detail, "invalid request body");
        HttpError::BadRequest(detail)
    })?;

    let request = PromptRequest::new(fields.with_default_model(state.default_model.as_deref()))
        .map_err(|e| {
            tracing::error!(field = e.field(), error = %e, "request validation failed");
            HttpError::from(e)
        })?;

    // the pipeline already logged the cause with prompt/model context
    let response = state.service.generate(&request).await?;

    Ok(GenerateResponse { response })
}

// Decode the body, prefixing the error with the path of the offending field
fn decode_fields(body: &[u8]) -> Result<PromptFields, String> {
    let mut de = serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(&mut de).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();
        // "." is the document root: syntax errors, missing fields
        if path == "." {
            inner.to_string()
        } else {
            format!("{path}: {inner}")
        }
    })
}
