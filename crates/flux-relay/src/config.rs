//! Command-line configuration.
//!
//! Every flag can also be supplied through a `FLUXCDBOT_*` environment
//! variable. [`Cli::into_config`] validates the raw values once at startup
//! and produces the immutable [`RelayConfig`].

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use flux_telegram::TELEGRAM_DEFAULT_API_BASE_URL;
use url::Url;

use crate::error::{RelayError, Result};

/// Log verbosity accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Everything, including trace output.
    All,
    /// Debug and above.
    Debug,
    /// Info and above.
    Info,
    /// Warnings and errors.
    Warn,
    /// Errors only.
    Error,
    /// Nothing.
    None,
}

impl LogLevel {
    /// The `EnvFilter` directive for this level.
    #[must_use]
    pub const fn directive(self) -> &'static str {
        match self {
            Self::All => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::None => "off",
        }
    }
}

/// Log output format accepted by `--log-format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable text.
    Text,
}

/// fluxcdbot - relay Flux CD events to Telegram chats
#[derive(Parser)]
#[command(name = "fluxcdbot")]
#[command(about = "Relay Flux CD notifications to Telegram chats")]
#[command(version)]
pub struct Cli {
    /// Webhook ingress listen address
    #[arg(long, env = "FLUXCDBOT_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Health and metrics listen address
    #[arg(long, env = "FLUXCDBOT_LISTEN_INTERNAL", default_value = "0.0.0.0:9090")]
    pub listen_internal: SocketAddr,

    /// Log level
    #[arg(long, env = "FLUXCDBOT_LOG_LEVEL", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, env = "FLUXCDBOT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// Credential store directory
    #[arg(long, env = "FLUXCDBOT_DATABASE", default_value = "/var/fluxcdbot")]
    pub database: PathBuf,

    /// Staging directory for credential writes (same filesystem as --database)
    #[arg(long, env = "FLUXCDBOT_TMP", default_value = "/var/fluxcdbot/tmp")]
    pub tmp: PathBuf,

    /// Telegram bot token
    #[arg(long, env = "FLUXCDBOT_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Public base URL that webhook paths are appended to
    #[arg(long, env = "FLUXCDBOT_URL", default_value = "http://127.0.0.1:8080")]
    pub url: String,

    /// Telegram Bot API base URL
    #[arg(long, env = "FLUXCDBOT_TELEGRAM_API_URL", default_value = TELEGRAM_DEFAULT_API_BASE_URL)]
    pub telegram_api_url: String,

    /// Long-poll timeout for bot updates, in seconds
    #[arg(long, env = "FLUXCDBOT_POLL_TIMEOUT", default_value_t = 10)]
    pub poll_timeout: u64,
}

impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("listen", &self.listen)
            .field("listen_internal", &self.listen_internal)
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Cli {
    /// Validates the flags and produces the runtime configuration.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Config` if the base URL cannot carry a path,
    /// the token is empty, the Bot API URL is not http(s), or the poll
    /// timeout is zero.
    pub fn into_config(self) -> Result<RelayConfig> {
        let url = parse_base_url(&self.url)?;

        if self.token.trim().is_empty() {
            return Err(RelayError::Config("bot token must not be empty".to_string()));
        }

        let api = Url::parse(&self.telegram_api_url).map_err(|e| {
            RelayError::Config(format!("invalid telegram api url {:?}: {e}", self.telegram_api_url))
        })?;
        if !matches!(api.scheme(), "http" | "https") {
            return Err(RelayError::Config(format!(
                "telegram api url must be http or https, got {:?}",
                api.scheme()
            )));
        }

        if self.poll_timeout == 0 {
            return Err(RelayError::Config("poll timeout must be positive".to_string()));
        }

        Ok(RelayConfig {
            listen: self.listen,
            listen_internal: self.listen_internal,
            log_level: self.log_level,
            log_format: self.log_format,
            database: self.database,
            tmp: self.tmp,
            token: self.token,
            url,
            telegram_api_url: self.telegram_api_url,
            poll_timeout: Duration::from_secs(self.poll_timeout),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| RelayError::Config(format!("invalid base url {raw:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(RelayError::Config(format!("base url {raw:?} cannot carry a path")));
    }
    Ok(url)
}

/// Validated, immutable process configuration.
#[derive(Clone)]
pub struct RelayConfig {
    /// Webhook ingress listen address.
    pub listen: SocketAddr,
    /// Health and metrics listen address.
    pub listen_internal: SocketAddr,
    /// Log level.
    pub log_level: LogLevel,
    /// Log output format.
    pub log_format: LogFormat,
    /// Credential store directory.
    pub database: PathBuf,
    /// Staging directory for atomic writes.
    pub tmp: PathBuf,
    /// Telegram bot token.
    pub token: String,
    /// Public base URL for callback links.
    pub url: Url,
    /// Telegram Bot API base URL.
    pub telegram_api_url: String,
    /// Long-poll timeout.
    pub poll_timeout: Duration,
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("listen", &self.listen)
            .field("listen_internal", &self.listen_internal)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("database", &self.database)
            .field("tmp", &self.tmp)
            .field("token", &"[REDACTED]")
            .field("url", &self.url.as_str())
            .field("telegram_api_url", &self.telegram_api_url)
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}
