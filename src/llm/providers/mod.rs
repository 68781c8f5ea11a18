//! Provider implementations.
//!
//! `build(config, secrets)` is the factory — called once at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod generate;
mod http;
pub mod responses;

use crate::config::{LlmConfig, Secrets};
use crate::llm::{LlmProvider, ProviderError};

/// Construct the configured `LlmProvider`.
///
/// Credentials come from `secrets` (env only, never TOML). A missing
/// credential for the selected provider is a configuration error.
pub fn build(config: &LlmConfig, secrets: &Secrets) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider)),
        "generate" | "gemini" => {
            let p = generate::GenerateProvider::new(&config.generate, secrets.gemini_api_token.clone())?;
            Ok(LlmProvider::Generate(p))
        }
        "responses" | "openai" => {
            let p = responses::ResponsesProvider::new(&config.responses, secrets.openai_api_key.clone())?;
            Ok(LlmProvider::Responses(p))
        }
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_dummy_without_secrets() {
        let p = build(&LlmConfig::test_default("dummy"), &Secrets::default()).unwrap();
        assert_eq!(p.name(), "dummy");
    }

    #[test]
    fn openai_alias_selects_responses() {
        let secrets = Secrets { openai_api_key: Some("sk".into()), ..Secrets::default() };
        let p = build(&LlmConfig::test_default("openai"), &secrets).unwrap();
        assert_eq!(p.name(), "responses");
    }

    #[test]
    fn gemini_alias_selects_generate() {
        let secrets = Secrets { gemini_api_token: Some("tok".into()), ..Secrets::default() };
        let p = build(&LlmConfig::test_default("gemini"), &secrets).unwrap();
        assert_eq!(p.name(), "generate");
    }

    #[test]
    fn missing_credential_is_configuration_error() {
        let err = build(&LlmConfig::test_default("generate"), &Secrets::default()).unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[test]
    fn unknown_provider_rejected() {
        let err = build(&LlmConfig::test_default("claude-via-carrier-pigeon"), &Secrets::default())
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownProvider(_)));
    }
}
