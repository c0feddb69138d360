use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::cors::cors_headers;
use crate::metrics::UPSTREAM_ERRORS;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Invalid message format")]
    InvalidMessage,

    #[error("{0}")]
    MalformedBody(#[from] serde_json::Error),

    // error.message from the upstream body, or a generic fallback
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            GatewayError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": "Method not allowed" }),
            ),
            GatewayError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": "Rate limit exceeded. Please try again in an hour.",
                    "remaining": 0
                }),
            ),
            GatewayError::InvalidMessage => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid message format" }),
            ),
            GatewayError::MalformedBody(_)
            | GatewayError::Upstream(_)
            | GatewayError::Transport(_)
            | GatewayError::Config(_) => {
                if matches!(self, GatewayError::Upstream(_) | GatewayError::Transport(_)) {
                    UPSTREAM_ERRORS.inc();
                }
                tracing::error!(error = %self, "chat request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Failed to process request. Please try again.",
                        "details": self.to_string()
                    }),
                )
            }
        };

        (status, cors_headers(), Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
