//! Shared transport for the HTTP providers.
//!
//! One authenticated JSON POST, awaited to completion or timeout. Every
//! failure is classified as [`ProviderError::Transport`] with a readable
//! diagnostic; the decoded body is handed back for extraction.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, trace};

use crate::llm::ProviderError;

/// Build a client with a fixed per-request timeout.
pub(crate) fn client(timeout_seconds: u64) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| ProviderError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Reject a missing or blank credential before any request is made.
pub(crate) fn require_token(token: Option<String>, env_name: &str) -> Result<String, ProviderError> {
    match token {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(ProviderError::Configuration(format!("missing {env_name} in environment"))),
    }
}

/// POST `body` to `url` with bearer auth and return the decoded response.
///
/// `label` prefixes error messages (`"Gemini"`, `"OpenAI"`).
pub(crate) async fn post_json<B: Serialize>(
    client: &Client,
    url: &str,
    token: &str,
    body: &B,
    label: &str,
) -> Result<Value, ProviderError> {
    if tracing::enabled!(tracing::Level::TRACE) {
        let json = serde_json::to_string_pretty(body)
            .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
        trace!(payload = %json, "full request payload");
    }

    // `.json()` also sets `Content-Type: application/json`.
    let response = client
        .post(url)
        .bearer_auth(token)
        .json(body)
        .send()
        .await
        .map_err(|e| {
            error!(%url, error = %e, timeout = e.is_timeout(), "request failed (transport)");
            ProviderError::Transport(format!("{label} request failed: {e}"))
        })?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ProviderError::Transport(format!("{label} request failed: {e}")))?;

    if !status.is_success() {
        let message = format!("{label} API error: HTTP {status}: {}", serialize_error_body(&text));
        error!(%status, %message, "provider returned HTTP error");
        return Err(ProviderError::Transport(message));
    }

    debug!(%status, body_len = text.len(), "received provider response");
    trace!(body = %text, "full response payload");

    // Non-JSON success bodies are kept as a string value so the raw fallback
    // still has something to return.
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

/// Compact re-serialization of a JSON error body, or the raw text.
fn serialize_error_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value.to_string(),
        Err(_) if body.trim().is_empty() => "<empty body>".to_string(),
        Err(_) => body.to_string(),
    }
}
