//! HTTP transport against the Lighter REST API.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration as StdDuration;
use tracing::{debug, info, warn};

use super::{check_code, NextNonceResponse, SendTxBatchResponse, SendTxResponse, Transport};
use crate::config::ClientConfig;
use crate::tx::Tx;
use crate::{Error, Result};

pub struct HttpClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpClient {
    /// Attempts at the nonce read before giving up.
    const NONCE_ATTEMPTS: u32 = 3;

    #[allow(clippy::result_large_err)]
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(StdDuration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn nonce_url(&self, account_index: u64, api_key_index: u8) -> String {
        format!(
            "{}/api/v1/nextNonce?account_index={}&api_key_index={}",
            self.base_url, account_index, api_key_index
        )
    }

    /// Read the nonce endpoint, retrying transient failures.
    ///
    /// Connection errors, 429 and 5xx are retried after [`backoff`]. Any
    /// other non-success status fails on the spot.
    async fn read_nonce(&self, url: &str) -> Result<NextNonceResponse> {
        let mut attempt = 0;
        loop {
            let (error, rate_limited) = match self.http_client.get(url).send().await {
                Ok(response) if response.status().is_success() => {
                    return Ok(response.json().await?);
                }
                Ok(response) => {
                    let status = response.status();
                    let Some(rate_limited) = retryable(status) else {
                        let text = response.text().await.unwrap_or_default();
                        return Err(Error::Api {
                            message: format!("nextNonce failed: {} - {}", status.as_u16(), text),
                            status: Some(status.as_u16()),
                        });
                    };
                    let error = Error::Api {
                        message: format!("nextNonce returned {}", status),
                        status: Some(status.as_u16()),
                    };
                    (error, rate_limited)
                }
                Err(e) => (Error::Http(e), false),
            };

            attempt += 1;
            if attempt >= Self::NONCE_ATTEMPTS {
                return Err(error);
            }
            let delay = backoff(attempt - 1, rate_limited);
            warn!(
                attempt,
                error = %error,
                delay_ms = delay.as_millis() as u64,
                "nextNonce failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Single POST, never retried: a resubmitted transaction could land twice.
    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http_client.post(&url).form(form).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                message: format!("POST {} failed: {} - {}", path, status, text),
                status: Some(status),
            });
        }

        Ok(response.json().await?)
    }
}

/// `Some(rate_limited)` when a failed nonce read is worth another attempt.
fn retryable(status: StatusCode) -> Option<bool> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        Some(true)
    } else if status.is_server_error() {
        Some(false)
    } else {
        None
    }
}

/// 500ms, 1s, 2s for server errors; 2s, 4s, 8s for rate limits.
fn backoff(attempt: u32, rate_limited: bool) -> StdDuration {
    let base = if rate_limited { 2000 } else { 500 };
    StdDuration::from_millis(base * 2u64.pow(attempt))
}

/// Form fields for `sendTxBatch`: parallel JSON arrays of types and infos.
#[allow(clippy::result_large_err)]
fn batch_form(txs: &[Tx]) -> Result<[(&'static str, String); 2]> {
    let tx_types: Vec<u8> = txs.iter().map(|tx| tx.tx_type().as_u8()).collect();
    let tx_infos: Vec<&str> = txs.iter().map(|tx| tx.tx_info()).collect();
    Ok([
        ("tx_types", serde_json::to_string(&tx_types)?),
        ("tx_infos", serde_json::to_string(&tx_infos)?),
    ])
}

#[async_trait]
impl Transport for HttpClient {
    async fn fetch_current_nonce(&self, account_index: u64, api_key_index: u8) -> Result<u64> {
        let url = self.nonce_url(account_index, api_key_index);
        let body = self.read_nonce(&url).await?;
        check_code(body.code, body.message.as_deref(), "nextNonce")?;

        debug!(
            account_index,
            api_key_index,
            nonce = body.nonce,
            "Fetched next nonce"
        );
        Ok(body.nonce)
    }

    async fn send_tx(&self, tx: &Tx) -> Result<String> {
        let form = [
            ("tx_type", tx.tx_type().as_u8().to_string()),
            ("tx_info", tx.tx_info().to_string()),
        ];
        let body: SendTxResponse = self.post_form("/api/v1/sendTx", &form).await?;
        check_code(body.code, body.message.as_deref(), "sendTx")?;

        info!(
            tx_type = %tx.tx_type(),
            nonce = tx.nonce(),
            tx_hash = %body.tx_hash,
            "Transaction submitted"
        );
        Ok(body.tx_hash)
    }

    async fn send_tx_batch(&self, txs: &[Tx]) -> Result<Vec<String>> {
        if txs.is_empty() {
            return Ok(Vec::new());
        }

        let form = batch_form(txs)?;
        let body: SendTxBatchResponse = self.post_form("/api/v1/sendTxBatch", &form).await?;
        check_code(body.code, body.message.as_deref(), "sendTxBatch")?;

        info!(count = txs.len(), "Transaction batch submitted");
        Ok(body.tx_hash)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
