//! Raw HTTP generate provider.
//!
//! Posts `{ "input": <prompt>, "max_tokens": <limit> }` to a configurable
//! endpoint with bearer auth and a 15 second timeout by default. The request
//! schema is broadly compatible rather than tied to one API version; the
//! reply is located by [`crate::llm::extract`].

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::GenerateConfig;
use crate::llm::extract;
use crate::llm::{GenerationRequest, ProviderError};

use super::http;

/// Env var the credential is read from by the config layer.
pub const TOKEN_ENV: &str = "GEMINI_API_TOKEN";

#[derive(Debug, Clone)]
pub struct GenerateProvider {
    client: Client,
    api_url: String,
    token: String,
    default_max_output_tokens: u32,
}

impl GenerateProvider {
    /// Fails with [`ProviderError::Configuration`] when `token` is missing.
    pub fn new(config: &GenerateConfig, token: Option<String>) -> Result<Self, ProviderError> {
        let token = http::require_token(token, TOKEN_ENV)?;
        let client = http::client(config.timeout_seconds)?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            token,
            default_max_output_tokens: config.max_output_tokens,
        })
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let body = GenerateRequest {
            input: request.prompt(),
            max_tokens: request.token_limit_or(self.default_max_output_tokens),
        };

        debug!(
            url = %self.api_url,
            max_tokens = body.max_tokens,
            prompt_len = body.input.len(),
            "sending generate request"
        );

        let payload = http::post_json(&self.client, &self.api_url, &self.token, &body, "Gemini").await?;

        let extracted = extract::extract(&payload);
        if extracted.is_degraded() {
            warn!(url = %self.api_url, "no known text field in response, returning raw payload");
        }
        Ok(extracted.into_text())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    input: &'a str,
    max_tokens: u32,
}
