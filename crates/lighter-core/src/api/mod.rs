//! Exchange transport.
//!
//! The builder never talks to the network directly. Nonce reads go through
//! [`TransportNonces`], submission through [`Transport`], so tests and
//! alternative backends plug in at one seam.

pub mod http;

pub use http::HttpClient;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::nonce::NonceSource;
use crate::tx::Tx;
use crate::{Error, Result};

/// Success code carried in every API response body.
pub const CODE_OK: i32 = 200;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Next nonce the exchange expects for an (account, api key) pair.
    async fn fetch_current_nonce(&self, account_index: u64, api_key_index: u8) -> Result<u64>;

    /// Submit one signed transaction, returning the exchange's tx hash.
    async fn send_tx(&self, tx: &Tx) -> Result<String>;

    /// Submit several signed transactions in one request, in order.
    async fn send_tx_batch(&self, txs: &[Tx]) -> Result<Vec<String>>;
}

/// Feeds a [`Transport`]'s nonce endpoint into the nonce tracker.
#[derive(Clone)]
pub struct TransportNonces(pub Arc<dyn Transport>);

#[async_trait]
impl NonceSource for TransportNonces {
    async fn fetch_current_nonce(&self, account_index: u64, api_key_index: u8) -> Result<u64> {
        self.0.fetch_current_nonce(account_index, api_key_index).await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NextNonceResponse {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub nonce: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendTxResponse {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub tx_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendTxBatchResponse {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub tx_hash: Vec<String>,
}

/// Map a non-200 body code to an API error.
#[allow(clippy::result_large_err)]
pub(crate) fn check_code(code: i32, message: Option<&str>, context: &str) -> Result<()> {
    if code == CODE_OK {
        return Ok(());
    }
    Err(Error::Api {
        message: format!(
            "{} rejected with code {}: {}",
            context,
            code,
            message.unwrap_or("no message")
        ),
        status: u16::try_from(code).ok(),
    })
}
