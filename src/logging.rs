//! Diagnostic logging via `tracing`.
//!
//! Logs go to stderr so stdout stays clean for answers and listings.
//! `RUST_LOG` takes precedence over both the config file and `-v`.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Filter directive for our crates: each `-v` raises the configured level
/// one step, up to `trace`.
pub fn directive(level: &str, verbose: u8) -> String {
    const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    let base = LEVELS
        .iter()
        .position(|l| l.eq_ignore_ascii_case(level))
        .unwrap_or(1);
    let level = LEVELS[(base + verbose as usize).min(LEVELS.len() - 1)];
    format!("doc_chat={level},doc_chat_core={level}")
}

pub fn init_logging(config: &LoggingConfig, verbose: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(&config.level, verbose)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}
