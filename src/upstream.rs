use serde_json::Value;
use std::time::Instant;

use crate::error::{GatewayError, Result};
use crate::metrics::REQUEST_LATENCY;
use crate::models::{Message, MessagesRequest};

const FALLBACK_ERROR: &str = "API request failed";

// Messages API client, persona goes into every request's system field
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_version: String,
    model: String,
    max_tokens: u32,
    persona: String,
}

impl UpstreamClient {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: String,
        api_version: String,
        model: String,
        max_tokens: u32,
        persona: String,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            api_version,
            model,
            max_tokens,
            persona,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // Build the request body for one user message
    pub fn build_request(&self, message: &str) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![Message::user(message)],
            system: self.persona.clone(),
        }
    }

    // non-2xx becomes Upstream with the upstream error.message
    pub async fn send(&self, message: &str) -> Result<Value> {
        let start_time = Instant::now();

        let res = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&self.build_request(message))
            .send()
            .await?;

        let status = res.status();
        let body: Value = res.json().await?;

        REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

        if !status.is_success() {
            tracing::warn!(%status, "upstream returned an error");
            return Err(GatewayError::Upstream(upstream_error_message(&body)));
        }

        Ok(body)
    }
}

// Pull error.message out of an upstream error body
fn upstream_error_message(body: &Value) -> String {
    body.get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .unwrap_or(FALLBACK_ERROR)
        .to_string()
}
