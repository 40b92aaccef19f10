use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::core::errors::{EditorError, Error};

/// Maps library errors onto HTTP responses with a JSON body.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::SearchToolUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Error::SearchToolFailure { .. } => StatusCode::BAD_GATEWAY,
            Error::Cancelled(_) => StatusCode::GATEWAY_TIMEOUT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Editor(EditorError::FileNotFound(_)) => StatusCode::NOT_FOUND,
            Error::Editor(EditorError::NotConfigured) => StatusCode::BAD_REQUEST,
            Error::Editor(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Io(_) | Error::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
