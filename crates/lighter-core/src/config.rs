//! Configuration management for the Lighter SDK.

use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

/// Default chain id used for domain separation.
pub const DEFAULT_CHAIN_ID: u64 = 304;

/// Transactions expire ten minutes after construction unless told otherwise.
pub const DEFAULT_TX_EXPIRY_SECS: u64 = 600;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_tx_expiry_secs")]
    pub tx_expiry_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_chain_id() -> u64 {
    DEFAULT_CHAIN_ID
}

fn default_tx_expiry_secs() -> u64 {
    DEFAULT_TX_EXPIRY_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            base_url: base_url.into(),
            chain_id,
            tx_expiry_secs: DEFAULT_TX_EXPIRY_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment variables.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            base_url: env::var("LIGHTER_BASE_URL").map_err(|_| Error::Config {
                message: "LIGHTER_BASE_URL environment variable not set".to_string(),
            })?,
            chain_id: env_u64("LIGHTER_CHAIN_ID", DEFAULT_CHAIN_ID)?,
            tx_expiry_secs: env_u64("LIGHTER_TX_EXPIRY_SECS", DEFAULT_TX_EXPIRY_SECS)?,
            request_timeout_secs: env_u64(
                "LIGHTER_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file (TOML, YAML or JSON by extension),
    /// with `LIGHTER_*` environment variables taking precedence.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix("LIGHTER"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings the client cannot run without.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::config("Base URL is required"));
        }

        let parsed = url::Url::parse(&self.base_url).map_err(|e| Error::Config {
            message: format!("Invalid base URL {}: {}", self.base_url, e),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("Base URL must be http(s), got {}", parsed.scheme()),
            });
        }

        if self.tx_expiry_secs == 0 {
            return Err(Error::config("tx_expiry_secs must be > 0"));
        }

        Ok(())
    }

    pub fn tx_expiry(&self) -> Duration {
        Duration::from_secs(self.tx_expiry_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[allow(clippy::result_large_err)]
fn env_u64(name: &str, default: u64) -> Result<u64> {
    parse_var(name, env::var(name).ok(), default)
}

/// An unset variable takes the default; a set one must parse.
#[allow(clippy::result_large_err)]
fn parse_var(name: &str, raw: Option<String>, default: u64) -> Result<u64> {
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| Error::Config {
            message: format!("{} must be an unsigned integer, got {:?}", name, raw),
        }),
    }
}
