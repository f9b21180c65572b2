//! API error types with HTTP response mapping.

use application::{AppError, ErrorKind};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Error from a dispatched request.
    App(AppError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => error_body(StatusCode::NOT_FOUND, msg, None),
            ApiError::BadRequest(msg) => error_body(StatusCode::BAD_REQUEST, msg, None),
            ApiError::App(err) => app_error_to_response(err),
        }
    }
}

fn app_error_to_response(err: AppError) -> Response {
    let status = match err.kind() {
        ErrorKind::ValidationFailed | ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        // The change was stored; only the outbound event is missing.
        ErrorKind::DeliveryFailed => StatusCode::BAD_GATEWAY,
        ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Persistence
        | ErrorKind::NoHandlerRegistered
        | ErrorKind::MultipleHandlersRegistered
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }

    let details = match &err {
        AppError::ValidationFailed(errors) => serde_json::to_value(errors).ok(),
        _ => None,
    };
    error_body(status, err.to_string(), details)
}

fn error_body(status: StatusCode, message: String, errors: Option<serde_json::Value>) -> Response {
    let body = match errors {
        Some(errors) => serde_json::json!({ "error": message, "errors": errors }),
        None => serde_json::json!({ "error": message }),
    };
    (status, axum::Json(body)).into_response()
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}
