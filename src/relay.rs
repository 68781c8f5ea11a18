//! Relay — decides whether an inbound message is answered and produces the
//! reply text.
//!
//! Gateway-independent: the Discord channel maps serenity events onto
//! [`InboundMessage`] and posts whatever [`Relay::respond`] returns.

use std::num::NonZeroU32;

use tracing::{debug, error, warn};

use crate::config::Config;
use crate::llm::{GenerationRequest, LlmProvider};

/// Discord rejects messages over 2000 characters.
pub const MAX_REPLY_CHARS: usize = 1900;

pub const APOLOGY_REPLY: &str =
    "Sorry, I had trouble generating a response right now. Please try again later.";
pub const EMPTY_REPLY: &str = "I couldn't think of a response. Try rephrasing your message.";

/// The parts of an inbound chat message the filter looks at.
#[derive(Debug, Clone, Copy)]
pub struct InboundMessage<'a> {
    /// `false` for direct messages.
    pub in_guild: bool,
    pub author_is_bot: bool,
    pub channel_id: u64,
    pub content: &'a str,
}

/// Accepts only human guild messages with content in one channel.
#[derive(Debug, Clone, Copy)]
pub struct RelayFilter {
    channel_id: u64,
}

impl RelayFilter {
    pub fn new(channel_id: u64) -> Self {
        Self { channel_id }
    }

    pub fn channel_id(&self) -> u64 {
        self.channel_id
    }

    /// The trimmed content to relay, or `None` when the message is ignored.
    pub fn accept<'a>(&self, msg: &InboundMessage<'a>) -> Option<&'a str> {
        if !msg.in_guild || msg.author_is_bot || msg.channel_id != self.channel_id {
            return None;
        }
        let content = msg.content.trim();
        (!content.is_empty()).then_some(content)
    }
}

/// Substitute `{{bot_name}}` and `{{message}}` once each.
pub fn render_prompt(template: &str, bot_name: &str, message: &str) -> String {
    // Name first so a `{{bot_name}}` typed by the user is left alone.
    template.replacen("{{bot_name}}", bot_name, 1).replacen("{{message}}", message, 1)
}

/// Split `text` into pieces of at most `max_chars` characters.
pub fn chunk_reply(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars.max(1))
        .map(|c| c.iter().collect())
        .collect()
}

/// Frames prompts and calls the provider. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Relay {
    provider: LlmProvider,
    bot_name: String,
    prompt_template: String,
    max_output_tokens: NonZeroU32,
}

impl Relay {
    pub fn new(config: &Config, provider: LlmProvider) -> Self {
        Self {
            provider,
            bot_name: config.bot_name.clone(),
            prompt_template: config.relay.prompt_template.clone(),
            max_output_tokens: config.relay.max_output_tokens,
        }
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    /// Generate the reply for `content`. Never fails: provider errors are
    /// logged and turned into an apology for the user.
    pub async fn respond(&self, content: &str) -> String {
        let prompt = render_prompt(&self.prompt_template, &self.bot_name, content);
        let request = match GenerationRequest::new(&prompt) {
            Ok(r) => r.with_max_output_tokens(self.max_output_tokens),
            Err(e) => {
                warn!(error = %e, "prompt rejected");
                return EMPTY_REPLY.to_string();
            }
        };

        debug!(provider = self.provider.name(), prompt_len = prompt.len(), "relaying prompt");

        match self.provider.generate(&request).await {
            Ok(reply) if reply.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(reply) => reply,
            Err(e) => {
                error!(provider = self.provider.name(), error = %e, "generation failed");
                APOLOGY_REPLY.to_string()
            }
        }
    }
}
