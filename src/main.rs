//! bolt-relay — entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config (file + env overrides)
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Validate credentials and build the provider (fatal on failure)
//!   6. Spawn Ctrl-C → shutdown signal watcher
//!   7. Run the Discord channel until shutdown

use tokio_util::sync::CancellationToken;
use tracing::info;

use bolt_relay::comms::discord::{DiscordChannel, RelayHandler};
use bolt_relay::error::AppError;
use bolt_relay::llm::providers;
use bolt_relay::relay::{Relay, RelayFilter};
use bolt_relay::{config, logger};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let configured = logger::parse_level(&config.log_level)?;
    let effective_log_level = logger::raise(configured, args.verbosity).to_string().to_lowercase();
    logger::init(&effective_log_level, args.verbosity > 0)?;

    info!(
        bot_name = %config.bot_name,
        channel_id = config.discord.channel_id,
        provider = %config.llm.provider,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    // Both are fatal before any network call.
    let token = config.discord_token()?.to_string();
    let provider = providers::build(&config.llm, &config.secrets)?;

    let relay = Relay::new(&config, provider);
    let handler = RelayHandler::new(RelayFilter::new(config.discord.channel_id), relay);

    let shutdown = CancellationToken::new();

    // Ctrl-C handler — cancels the token so the channel shuts down.
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    DiscordChannel::new(token, handler).run(shutdown).await?;

    info!("bye");
    Ok(())
}

struct CliArgs {
    verbosity: u8,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: bolt-relay [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -v, -vv                    Increase logging verbosity");
                println!();
                println!("Environment:");
                println!("  DISCORD_BOT_TOKEN, DISCORD_CHANNEL_ID    required");
                println!("  OPENAI_API_KEY | GEMINI_API_TOKEN        credential for the selected provider");
                std::process::exit(0);
            }
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a => {
                if let Some(n) = verbosity_flag(a) {
                    verbosity = verbosity.saturating_add(n);
                }
            }
        }
    }

    CliArgs { verbosity, config_path }
}

/// Count of `v`s in a `-v`, `-vv`, … flag; saturates at `u8::MAX`.
fn verbosity_flag(arg: &str) -> Option<u8> {
    let vs = arg.strip_prefix('-')?;
    if vs.is_empty() || !vs.chars().all(|c| c == 'v') {
        return None;
    }
    Some(u8::try_from(vs.len()).unwrap_or(u8::MAX))
}
