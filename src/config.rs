//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` (or the path given with `-f`), then applies
//! env overrides. Credentials are read from env only, never from TOML.
//! The resolved [`Config`] is built once at startup and passed by reference;
//! nothing below `main` reads the environment.

use std::{
    env, fmt, fs,
    num::NonZeroU32,
    path::Path,
};

use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

pub const DEFAULT_PROMPT_TEMPLATE: &str = "You are {{bot_name}}, a helpful, concise, and polite \
assistant in a Discord channel. User said: {{message}}";

/// Relay behaviour.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Token limit passed on every relayed prompt.
    pub max_output_tokens: NonZeroU32,
    /// Prompt framing with `{{bot_name}}` and `{{message}}` placeholders.
    pub prompt_template: String,
}

/// Discord channel configuration.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// The only channel the relay answers in.
    pub channel_id: u64,
}

/// Raw HTTP generate provider (`[llm.generate]`).
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Full endpoint URL.
    pub api_url: String,
    /// Used when the caller gives no limit.
    pub max_output_tokens: u32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// OpenAI Responses API provider (`[llm.responses]`).
#[derive(Debug, Clone)]
pub struct ResponsesConfig {
    pub api_url: String,
    pub model: String,
    /// Omitted from the request when `None` and the caller gives no limit.
    pub max_output_tokens: Option<u32>,
    pub timeout_seconds: u64,
}

/// Provider selection and per-provider settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"dummy"`, `"generate"`, `"responses"`).
    /// Maps to `default` in `[llm]`.
    pub provider: String,
    pub generate: GenerateConfig,
    pub responses: ResponsesConfig,
}

/// Credentials, sourced from env only.
#[derive(Clone, Default)]
pub struct Secrets {
    pub discord_bot_token: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_api_token: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Secrets")
            .field("discord_bot_token", &mask(&self.discord_bot_token))
            .field("openai_api_key", &mask(&self.openai_api_key))
            .field("gemini_api_token", &mask(&self.gemini_api_token))
            .finish()
    }
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_name: String,
    pub log_level: String,
    pub relay: RelayConfig,
    pub discord: DiscordConfig,
    pub llm: LlmConfig,
    pub secrets: Secrets,
}

impl Config {
    /// The Discord bot token; its absence is fatal at startup.
    pub fn discord_token(&self) -> Result<&str, AppError> {
        self.secrets
            .discord_bot_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Config("missing DISCORD_BOT_TOKEN in environment".into()))
    }
}

/// Values taken from the process environment.
///
/// Gathered in one place so tests can pass overrides directly instead of
/// mutating env vars.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub log_level: Option<String>,
    pub channel_id: Option<String>,
    pub provider: Option<String>,
    pub gemini_api_url: Option<String>,
    pub openai_model: Option<String>,
    pub max_output_tokens: Option<String>,
    pub secrets: Secrets,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("BOLT_LOG_LEVEL").ok(),
            channel_id: env::var("DISCORD_CHANNEL_ID").ok(),
            provider: env::var("LLM_PROVIDER").ok(),
            gemini_api_url: env::var("GEMINI_API_URL").ok(),
            openai_model: env::var("OPENAI_MODEL").ok(),
            max_output_tokens: env::var("LLM_MAX_OUTPUT_TOKENS").ok(),
            secrets: Secrets {
                discord_bot_token: env::var("DISCORD_BOT_TOKEN").ok(),
                openai_api_key: env::var("OPENAI_API_KEY").ok(),
                gemini_api_token: env::var("GEMINI_API_TOKEN").ok(),
            },
        }
    }
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    relay: RawRelay,
    #[serde(default)]
    discord: RawDiscord,
    #[serde(default)]
    llm: RawLlm,
}

#[derive(Deserialize)]
struct RawRelay {
    #[serde(default = "default_bot_name")]
    bot_name: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_relay_max_output_tokens")]
    max_output_tokens: u32,
    #[serde(default = "default_prompt_template")]
    prompt_template: String,
}

impl Default for RawRelay {
    fn default() -> Self {
        Self {
            bot_name: default_bot_name(),
            log_level: default_log_level(),
            max_output_tokens: default_relay_max_output_tokens(),
            prompt_template: default_prompt_template(),
        }
    }
}

#[derive(Deserialize, Default)]
struct RawDiscord {
    #[serde(default)]
    channel_id: Option<u64>,
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    generate: RawGenerate,
    #[serde(default)]
    responses: RawResponses,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            generate: RawGenerate::default(),
            responses: RawResponses::default(),
        }
    }
}

#[derive(Deserialize)]
struct RawGenerate {
    #[serde(default = "default_generate_api_url")]
    api_url: String,
    #[serde(default = "default_generate_max_output_tokens")]
    max_output_tokens: u32,
    #[serde(default = "default_generate_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawGenerate {
    fn default() -> Self {
        Self {
            api_url: default_generate_api_url(),
            max_output_tokens: default_generate_max_output_tokens(),
            timeout_seconds: default_generate_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawResponses {
    #[serde(default = "default_responses_api_url")]
    api_url: String,
    #[serde(default = "default_responses_model")]
    model: String,
    #[serde(default)]
    max_output_tokens: Option<u32>,
    #[serde(default = "default_responses_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawResponses {
    fn default() -> Self {
        Self {
            api_url: default_responses_api_url(),
            model: default_responses_model(),
            max_output_tokens: None,
            timeout_seconds: default_responses_timeout_seconds(),
        }
    }
}

fn default_bot_name() -> String { "Bolt".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_relay_max_output_tokens() -> u32 { 400 }
fn default_prompt_template() -> String { DEFAULT_PROMPT_TEMPLATE.to_string() }
fn default_llm_provider() -> String { "responses".to_string() }
fn default_generate_api_url() -> String { "https://api.gemini.example/v1/generate".to_string() }
fn default_generate_max_output_tokens() -> u32 { 512 }
fn default_generate_timeout_seconds() -> u64 { 15 }
fn default_responses_api_url() -> String { "https://api.openai.com/v1/responses".to_string() }
fn default_responses_model() -> String { "gpt-4o-mini".to_string() }
fn default_responses_timeout_seconds() -> u64 { 60 }

/// Load config from `config_path`, or `config/default.toml`, then apply
/// env-var overrides. Without an explicit path a missing default file falls
/// back to built-in defaults.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = EnvOverrides::from_env();
    match config_path {
        Some(path) => load_from(Path::new(path), &overrides),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_from(Path::new(DEFAULT_CONFIG_PATH), &overrides)
        }
        None => resolve(RawConfig::default(), &overrides),
    }
}

/// Load from an explicit path with explicit overrides.
pub fn load_from(path: &Path, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    resolve(parsed, overrides)
}

fn resolve(parsed: RawConfig, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let channel_id = match &overrides.channel_id {
        Some(s) => Some(s.trim().parse::<u64>().map_err(|_| {
            AppError::Config(format!("DISCORD_CHANNEL_ID is not a numeric id: '{s}'"))
        })?),
        None => parsed.discord.channel_id,
    }
    .ok_or_else(|| AppError::Config("missing DISCORD_CHANNEL_ID (env or [discord] channel_id)".into()))?;

    let max_tokens = match &overrides.max_output_tokens {
        Some(s) => s.trim().parse::<u32>().map_err(|_| {
            AppError::Config(format!("LLM_MAX_OUTPUT_TOKENS is not a number: '{s}'"))
        })?,
        None => parsed.relay.max_output_tokens,
    };
    let max_output_tokens = NonZeroU32::new(max_tokens)
        .ok_or_else(|| AppError::Config("max_output_tokens must be positive".into()))?;

    let r = parsed.llm;
    for (section, timeout) in [
        ("llm.generate", r.generate.timeout_seconds),
        ("llm.responses", r.responses.timeout_seconds),
    ] {
        if timeout == 0 {
            return Err(AppError::Config(format!("{section}.timeout_seconds must be positive")));
        }
    }

    let mut generate = GenerateConfig {
        api_url: r.generate.api_url,
        max_output_tokens: r.generate.max_output_tokens,
        timeout_seconds: r.generate.timeout_seconds,
    };
    if let Some(url) = &overrides.gemini_api_url {
        generate.api_url = url.clone();
    }

    let mut responses = ResponsesConfig {
        api_url: r.responses.api_url,
        model: r.responses.model,
        max_output_tokens: r.responses.max_output_tokens,
        timeout_seconds: r.responses.timeout_seconds,
    };
    if let Some(model) = &overrides.openai_model {
        responses.model = model.clone();
    }

    Ok(Config {
        bot_name: parsed.relay.bot_name,
        log_level: overrides.log_level.clone().unwrap_or(parsed.relay.log_level),
        relay: RelayConfig {
            max_output_tokens,
            prompt_template: parsed.relay.prompt_template,
        },
        discord: DiscordConfig { channel_id },
        llm: LlmConfig {
            provider: overrides.provider.clone().unwrap_or(r.provider),
            generate,
            responses,
        },
        secrets: overrides.secrets.clone(),
    })
}

// ── test helpers ──────────────────────────────────────────────────────────────

#[cfg(test)]
impl LlmConfig {
    /// Provider settings pointing nowhere; no external calls.
    pub fn test_default(provider: &str) -> Self {
        Self {
            provider: provider.into(),
            generate: GenerateConfig {
                api_url: "http://localhost:0/v1/generate".into(),
                max_output_tokens: 512,
                timeout_seconds: 1,
            },
            responses: ResponsesConfig {
                api_url: "http://localhost:0/v1/responses".into(),
                model: "test-model".into(),
                max_output_tokens: None,
                timeout_seconds: 1,
            },
        }
    }
}
