//! Text-generation provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities — clone them freely.
//! Each `generate` call is one outbound request with no retries and no state
//! carried between calls.

pub mod extract;
pub mod providers;

use std::num::NonZeroU32;

use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Required credential or setting missing. Raised before any network call.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Network failure, timeout or non-2xx response.
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

// ── Request ───────────────────────────────────────────────────────────────────

/// One prompt, constructed per call and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    max_output_tokens: Option<NonZeroU32>,
}

impl GenerationRequest {
    /// Build a request from `prompt`, stored trimmed. Blank prompts are rejected.
    pub fn new(prompt: impl AsRef<str>) -> Result<Self, ProviderError> {
        let prompt = prompt.as_ref().trim();
        if prompt.is_empty() {
            return Err(ProviderError::InvalidRequest("prompt must not be empty".into()));
        }
        Ok(Self { prompt: prompt.to_string(), max_output_tokens: None })
    }

    pub fn with_max_output_tokens(mut self, limit: NonZeroU32) -> Self {
        self.max_output_tokens = Some(limit);
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn max_output_tokens(&self) -> Option<NonZeroU32> {
        self.max_output_tokens
    }

    /// The caller's limit, or `default` when none was given.
    pub fn token_limit_or(&self, default: u32) -> u32 {
        self.max_output_tokens.map(NonZeroU32::get).unwrap_or(default)
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
/// Adding a backend = new module + new variant + new `generate` arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    Generate(providers::generate::GenerateProvider),
    Responses(providers::responses::ResponsesProvider),
}

impl LlmProvider {
    /// Send the request to the provider and return its normalized text reply.
    ///
    /// Success is never an empty string.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        match self {
            LlmProvider::Dummy(p) => p.generate(request).await,
            LlmProvider::Generate(p) => p.generate(request).await,
            LlmProvider::Responses(p) => p.generate(request).await,
        }
    }

    /// Short provider name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::Dummy(_) => "dummy",
            LlmProvider::Generate(_) => "generate",
            LlmProvider::Responses(_) => "responses",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_trims_prompt() {
        let req = GenerationRequest::new("  hello there \n").unwrap();
        assert_eq!(req.prompt(), "hello there");
        assert_eq!(req.max_output_tokens(), None);
    }

    #[test]
    fn blank_prompt_rejected() {
        assert!(matches!(
            GenerationRequest::new("   \t\n"),
            Err(ProviderError::InvalidRequest(_))
        ));
        assert!(GenerationRequest::new("").is_err());
    }

    #[test]
    fn token_limit_falls_back_to_default() {
        let req = GenerationRequest::new("hi").unwrap();
        assert_eq!(req.token_limit_or(512), 512);

        let req = req.with_max_output_tokens(NonZeroU32::new(400).unwrap());
        assert_eq!(req.token_limit_or(512), 400);
    }

    #[test]
    fn error_messages_carry_detail() {
        let e = ProviderError::Transport("HTTP 500: {\"error\":\"boom\"}".into());
        assert!(e.to_string().contains("boom"));
        let e = ProviderError::Configuration("missing GEMINI_API_TOKEN".into());
        assert!(e.to_string().contains("GEMINI_API_TOKEN"));
    }

    #[tokio::test]
    async fn dummy_variant_dispatches() {
        let provider = LlmProvider::Dummy(providers::dummy::DummyProvider);
        let req = GenerationRequest::new("ping").unwrap();
        assert_eq!(provider.generate(&req).await.unwrap(), "[echo] ping");
        assert_eq!(provider.name(), "dummy");
    }
}
