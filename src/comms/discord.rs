//! Discord comms channel — receives guild messages via the serenity gateway,
//! relays accepted ones and replies to the original message.

use serenity::{
    all::{Client, Context, EventHandler, GatewayIntents, Message, Ready},
    async_trait,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::relay::{InboundMessage, MAX_REPLY_CHARS, Relay, RelayFilter, chunk_reply};

// ── Handler ──────────────────────────────────────────────────────────────────

/// Gateway event handler. Each `message` event is served independently;
/// handlers share only immutable state.
pub struct RelayHandler {
    filter: RelayFilter,
    relay: Relay,
}

impl RelayHandler {
    pub fn new(filter: RelayFilter, relay: Relay) -> Self {
        Self { filter, relay }
    }

    /// Guild messages with content, nothing else.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
    }
}

#[async_trait]
impl EventHandler for RelayHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_user = %ready.user.name,
            bot_name = %self.relay.bot_name(),
            channel_id = self.filter.channel_id(),
            guilds = ready.guilds.len(),
            "discord relay online"
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let inbound = InboundMessage {
            in_guild: msg.guild_id.is_some(),
            author_is_bot: msg.author.bot,
            channel_id: msg.channel_id.get(),
            content: &msg.content,
        };
        let Some(content) = self.filter.accept(&inbound) else {
            return;
        };

        info!(
            author = %msg.author.name,
            channel_id = inbound.channel_id,
            content_len = content.len(),
            "received message"
        );
        debug!(%content, "message content");

        if let Err(e) = msg.channel_id.broadcast_typing(&ctx).await {
            debug!(error = %e, "typing indicator failed");
        }

        let reply = self.relay.respond(content).await;

        let mut chunks = chunk_reply(&reply, MAX_REPLY_CHARS).into_iter();
        if let Some(first) = chunks.next() {
            if let Err(e) = msg.reply(&ctx, first).await {
                warn!(error = %e, "failed to send discord reply");
                return;
            }
        }
        for chunk in chunks {
            if let Err(e) = msg.channel_id.say(&ctx, chunk).await {
                warn!(error = %e, "failed to send discord reply chunk");
                return;
            }
        }
    }
}

// ── DiscordChannel ───────────────────────────────────────────────────────────

pub struct DiscordChannel {
    token: String,
    handler: RelayHandler,
}

impl DiscordChannel {
    pub fn new(token: impl Into<String>, handler: RelayHandler) -> Self {
        Self { token: token.into(), handler }
    }

    /// Log in and serve events until the gateway exits or `shutdown` fires.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), AppError> {
        let mut client = Client::builder(&self.token, RelayHandler::intents())
            .event_handler(self.handler)
            .await
            .map_err(|e| AppError::Gateway(format!("failed to build discord client: {e}")))?;

        let shard_manager = client.shard_manager.clone();

        info!("discord channel starting");

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("shutdown signal received — closing discord channel");
                shard_manager.shutdown_all().await;
            }
            result = client.start() => {
                result.map_err(|e| AppError::Gateway(format!("discord gateway failed: {e}")))?;
                warn!("discord gateway exited unexpectedly");
            }
        }

        Ok(())
    }
}
