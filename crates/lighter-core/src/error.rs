//! Error types for the Lighter SDK.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A request violated a field invariant. Raised before any hashing,
    /// signing or network work.
    #[error("Invalid field `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Signing error: {message}")]
    Signing { message: String },

    /// The first nonce fetch for an (account, api key) pair failed. The pair
    /// stays unestablished, so the next request fetches again.
    #[error("Nonce resolution failed for account {account_index} api key {api_key_index}: {source}")]
    NonceResolution {
        account_index: u64,
        api_key_index: u8,
        #[source]
        source: Box<Error>,
    },

    #[error("API error: {message}")]
    Api { message: String, status: Option<u16> },
}

impl Error {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Returns the offending field for validation errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Error::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// True for failures reported by the transport (network or remote rejection).
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Api { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
