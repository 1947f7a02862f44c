//! fluxcdbot - relay Flux CD notifications to Telegram chats.
//!
//! Chats register with `/start` and receive a webhook URL; Flux posts events
//! to that URL and the bot forwards them to the chat.

use clap::Parser;
use flux_relay::config::Cli;
use flux_relay::{server, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config()?;
    telemetry::init_tracing(config.log_level, config.log_format)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.listen,
        listen_internal = %config.listen_internal,
        url = %config.url,
        "starting fluxcdbot"
    );

    server::run(config).await?;
    Ok(())
}
