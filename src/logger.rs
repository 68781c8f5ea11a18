//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, after the effective level is resolved.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Initialise the global tracing subscriber, writing to stderr.
///
/// When `force_level` is `true` (a `-v` flag was given) `level` wins over
/// `RUST_LOG`. Otherwise `RUST_LOG` wins and `level` is the fallback.
pub fn init(level: &str, force_level: bool) -> Result<(), AppError> {
    let filter = if force_level {
        EnvFilter::try_new(level)
            .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))?
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(())
}

/// Parse a log level string into a [`LevelFilter`], returning an error on
/// unrecognised values.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))
}

/// Raise `base` by `verbosity` tiers (`info` + 1 → `debug` + 1 → `trace`).
/// Saturates at `trace`.
pub fn raise(base: LevelFilter, verbosity: u8) -> LevelFilter {
    const TIERS: [LevelFilter; 6] = [
        LevelFilter::OFF,
        LevelFilter::ERROR,
        LevelFilter::WARN,
        LevelFilter::INFO,
        LevelFilter::DEBUG,
        LevelFilter::TRACE,
    ];
    let start = TIERS.iter().position(|l| *l == base).unwrap_or(3);
    let idx = (start + verbosity as usize).min(TIERS.len() - 1);
    TIERS[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_levels_parse() {
        for l in &["error", "warn", "info", "debug", "trace"] {
            assert!(parse_level(l).is_ok(), "expected '{l}' to be valid");
        }
    }

    #[test]
    fn invalid_level_errors() {
        assert!(parse_level("verbose").is_err());
        assert!(parse_level("").is_err());
        assert!(parse_level("INFO_LEVEL").is_err());
    }

    #[test]
    fn raise_steps_one_tier_per_flag() {
        assert_eq!(raise(LevelFilter::INFO, 0), LevelFilter::INFO);
        assert_eq!(raise(LevelFilter::INFO, 1), LevelFilter::DEBUG);
        assert_eq!(raise(LevelFilter::WARN, 2), LevelFilter::DEBUG);
    }

    #[test]
    fn raise_saturates_at_trace() {
        assert_eq!(raise(LevelFilter::INFO, 9), LevelFilter::TRACE);
        assert_eq!(raise(LevelFilter::TRACE, 1), LevelFilter::TRACE);
    }

    #[test]
    fn init_info_succeeds_or_already_init() {
        // May already be set by another test in the same process.
        match init("info", false) {
            Ok(()) => {}
            Err(AppError::Logger(msg)) if msg.contains("set subscriber") => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
