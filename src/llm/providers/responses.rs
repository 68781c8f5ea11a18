//! OpenAI Responses API provider (`/v1/responses`).
//!
//! Sends `{ model, input, max_output_tokens }` and locates the reply with the
//! shared extraction strategies: `output_text` when the API provides it,
//! otherwise the `output[0].content[]` text fragments.

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ResponsesConfig;
use crate::llm::extract;
use crate::llm::{GenerationRequest, ProviderError};

use super::http;

pub const TOKEN_ENV: &str = "OPENAI_API_KEY";

/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct ResponsesProvider {
    client: Client,
    api_url: String,
    model: String,
    api_key: String,
    default_max_output_tokens: Option<u32>,
}

impl ResponsesProvider {
    pub fn new(config: &ResponsesConfig, api_key: Option<String>) -> Result<Self, ProviderError> {
        let api_key = http::require_token(api_key, TOKEN_ENV)?;
        let client = http::client(config.timeout_seconds)?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            api_key,
            default_max_output_tokens: config.max_output_tokens,
        })
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        // Limit is optional here: some models ignore or reject it.
        let max_output_tokens = request
            .max_output_tokens()
            .map(|n| n.get())
            .or(self.default_max_output_tokens);

        let body = ResponsesRequest {
            model: &self.model,
            input: request.prompt(),
            max_output_tokens,
        };

        debug!(
            model = %self.model,
            max_output_tokens = ?max_output_tokens,
            prompt_len = body.input.len(),
            "sending responses request"
        );

        let payload = http::post_json(&self.client, &self.api_url, &self.api_key, &body, "OpenAI").await?;

        let extracted = extract::extract(&payload);
        if extracted.is_degraded() {
            warn!(model = %self.model, "no text output in response, returning raw payload");
        }
        Ok(extracted.into_text())
    }
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn config(url: String, max_output_tokens: Option<u32>) -> ResponsesConfig {
        ResponsesConfig {
            api_url: url,
            model: "gpt-4o-mini".into(),
            max_output_tokens,
            timeout_seconds: 5,
        }
    }

    #[tokio::test]
    async fn sends_model_and_caller_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/responses")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::Json(json!({
                "model": "gpt-4o-mini",
                "input": "hello",
                "max_output_tokens": 400
            })))
            .with_status(200)
            .with_body(
                json!({
                    "id": "resp_1",
                    "output": [{
                        "type": "message",
                        "content": [
                            { "type": "output_text", "text": "Hello" },
                            { "type": "output_text", "text": " back" }
                        ]
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let provider = ResponsesProvider::new(
            &config(format!("{}/v1/responses", server.url()), None),
            Some("sk-test".into()),
        )
        .unwrap();
        let req = GenerationRequest::new("hello")
            .unwrap()
            .with_max_output_tokens(NonZeroU32::new(400).unwrap());
        assert_eq!(provider.generate(&req).await.unwrap(), "Hello back");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn limit_omitted_when_unset() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::Json(json!({ "model": "gpt-4o-mini", "input": "hi" })))
            .with_status(200)
            .with_body(json!({ "output_text": "yo" }).to_string())
            .create_async()
            .await;

        let provider =
            ResponsesProvider::new(&config(server.url(), None), Some("sk".into())).unwrap();
        let req = GenerationRequest::new("hi").unwrap();
        assert_eq!(provider.generate(&req).await.unwrap(), "yo");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn configured_default_limit_applies() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "max_output_tokens": 256 })))
            .with_status(200)
            .with_body(json!({ "output": [{ "text": "fine" }] }).to_string())
            .create_async()
            .await;

        let provider =
            ResponsesProvider::new(&config(server.url(), Some(256)), Some("sk".into())).unwrap();
        let req = GenerationRequest::new("hi").unwrap();
        assert_eq!(provider.generate(&req).await.unwrap(), "fine");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_carries_serialized_payload() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(429)
            .with_body(r#"{"error": {"message": "Rate limit", "code": "rate_limit_exceeded"}}"#)
            .create_async()
            .await;

        let provider =
            ResponsesProvider::new(&config(server.url(), None), Some("sk".into())).unwrap();
        let req = GenerationRequest::new("hi").unwrap();
        let err = provider.generate(&req).await.unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, ProviderError::Transport(_)));
        assert!(msg.contains("OpenAI API error"), "{msg}");
        assert!(msg.contains(r#""code":"rate_limit_exceeded""#), "{msg}");
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

        let err = ResponsesProvider::new(&config(server.url(), None), None).unwrap_err();
        assert!(err.to_string().contains(TOKEN_ENV));
        mock.assert_async().await;
    }
}
