//! Server error types and the HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use webbaby_shared::WebBabyError;

/// Errors that stop the server itself.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop failed
    #[error("internal error: {0}")]
    Internal(String),
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// A domain error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub WebBabyError);

impl From<WebBabyError> for ApiError {
    fn from(err: WebBabyError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            e if e.is_user_error() => StatusCode::BAD_REQUEST,
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            WebBabyError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, %status, "request failed");
        } else {
            tracing::debug!(error = %self.0, %status, "request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                detail: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
