use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::sync::Arc;

use crate::cors::cors_headers;
use crate::error::{GatewayError, Result};
use crate::metrics::{RATE_LIMITED, REQUEST_TOTAL};
use crate::state::AppState;

const UNKNOWN_CLIENT: &str = "unknown";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

// Client identifier for rate limiting. Caller-supplied and unauthenticated.
pub fn client_identifier(headers: &HeaderMap) -> String {
    ["x-forwarded-for", "client-ip"]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

// Pull a non-empty string `message` out of the request body
pub fn parse_message(body: &[u8]) -> Result<String> {
    let payload: Value = serde_json::from_slice(body)?;

    match payload.get("message").and_then(Value::as_str) {
        Some(message) if !message.is_empty() => Ok(message.to_string()),
        _ => Err(GatewayError::InvalidMessage),
    }
}

// chat handler - every method lands here so non-POST gets the JSON 405
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    if method == Method::OPTIONS {
        return Ok((StatusCode::OK, cors_headers()).into_response());
    }
    if method != Method::POST {
        return Err(GatewayError::MethodNotAllowed);
    }

    REQUEST_TOTAL.inc();

    let ip = client_identifier(&headers);
    let decision = state.rate_limiter.check_now(&ip);
    if !decision.allowed {
        RATE_LIMITED.inc();
        tracing::warn!(client = %ip, "rate limit exceeded");
        return Err(GatewayError::RateLimited);
    }

    let message = parse_message(&body)?;
    tracing::debug!(client = %ip, remaining = decision.remaining, "forwarding chat message");

    let data = state.upstream.send(&message).await?;

    let mut headers = cors_headers();
    headers.insert(REMAINING_HEADER, HeaderValue::from(decision.remaining));

    Ok((StatusCode::OK, headers, Json(data)).into_response())
}
