//! Library root for `poll-translate-bot`.
//!
//! A small Slack bot that:
//! - Greets people who say hello
//! - Runs quick three-option polls through a shortcut and a modal
//! - Translates messages when someone reacts with a country flag
//!
//! The bot receives Slack events over signed webhooks and calls a remote
//! translation service. Both integrations sit behind traits so that either
//! can be swapped out (or mocked in tests).

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the translation and chat clients
/// - Serves Slack webhooks until shutdown
pub async fn start(config: Config) -> Void {
    info!("Starting poll-translate-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install the rustls crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
