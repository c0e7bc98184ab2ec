//! Error types and HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Message returned to callers for every non-validation failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Errors raised while serving an API request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Caller input is malformed. The message is safe to return as-is.
    #[error("{0}")]
    Validation(String),

    /// An upstream answered with a non-success status.
    #[error("{service} request failed: {status} {reason}")]
    Upstream {
        service: &'static str,
        status: u16,
        reason: String,
    },

    /// An upstream answered successfully but with an unexpected body.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The outbound request could not be completed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Build an upstream error from a failed response status.
    pub fn upstream(service: &'static str, status: reqwest::StatusCode) -> Self {
        Self::Upstream {
            service,
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } | Self::Protocol(_) | Self::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message exposed to the caller. Upstream detail stays in the logs.
    pub fn client_message(&self) -> &str {
        match self {
            Self::Validation(message) => message,
            _ => INTERNAL_ERROR_MESSAGE,
        }
    }
}

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse<'a> {
    pub error: &'a str,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.client_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_keep_their_message() {
        let err = GatewayError::validation("Limit must be between 1 and 100");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "Limit must be between 1 and 100");
    }

    #[test]
    fn upstream_detail_is_not_exposed() {
        let err = GatewayError::upstream("token service", reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "token service request failed: 502 Bad Gateway");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn protocol_errors_map_to_500() {
        let err = GatewayError::protocol("Response does not contain access_token");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), INTERNAL_ERROR_MESSAGE);
    }
}
