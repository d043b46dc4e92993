use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::any::Any;
use thiserror::Error;

use crate::error::{ServiceError, ValidationError};

pub const INTERNAL_ERROR_DETAIL: &str = "Internal server error";

// Errors a handler can hand back to the client
#[derive(Debug, Error)]
pub enum HttpError {
    // client sent something unusable
    #[error("Invalid request data: {0}")]
    BadRequest(String),

    // upstream or pipeline failure
    #[error("Error processing request: {0}")]
    Service(String),

    // anything else; details stay in the server log
    #[error("{}", INTERNAL_ERROR_DETAIL)]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::Service(_) | HttpError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<ValidationError> for HttpError {
    fn from(err: ValidationError) -> Self {
        HttpError::BadRequest(err.to_string())
    }
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        HttpError::Service(err.to_string())
    }
}

// Response for a handler that panicked; the panic payload only goes to the log
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = message, "unhandled failure while serving request");
    HttpError::Internal.into_response()
}
