//! Transaction construction.
//!
//! Every public `construct_*` method funnels into [`TransactionBuilder::construct`]:
//! validate, resolve nonce, resolve expiry, hash, sign, assemble. Invalid
//! input is rejected before a nonce is claimed or the signer is called.

use alloy_primitives::B256;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::nonce::NonceTracker;
use crate::signing::{KeyManager, TxDomain, SIGNATURE_LEN};
use crate::tx::{Tx, TxBody, TxEnvelope};
use crate::types::{
    CancelOrderTxReq, CreateGroupedOrdersTxReq, CreateOrderTxReq, ModifyOrderTxReq, TransactOpts,
    TransferTxReq, WithdrawTxReq,
};
use crate::{Error, Result};

pub struct TransactionBuilder {
    keys: KeyManager,
    nonces: Arc<NonceTracker>,
    domain_separator: B256,
    tx_expiry: Duration,
}

impl TransactionBuilder {
    pub fn new(
        keys: KeyManager,
        nonces: Arc<NonceTracker>,
        domain: &TxDomain,
        tx_expiry: Duration,
    ) -> Self {
        Self {
            keys,
            nonces,
            domain_separator: domain.separator(),
            tx_expiry,
        }
    }

    pub fn domain_separator(&self) -> B256 {
        self.domain_separator
    }

    pub fn nonce_tracker(&self) -> &Arc<NonceTracker> {
        &self.nonces
    }

    pub fn keys(&self) -> &KeyManager {
        &self.keys
    }

    pub async fn construct_create_order_tx(
        &self,
        req: CreateOrderTxReq,
        opts: TransactOpts,
    ) -> Result<Tx> {
        self.construct(req.into(), opts).await
    }

    pub async fn construct_cancel_order_tx(
        &self,
        req: CancelOrderTxReq,
        opts: TransactOpts,
    ) -> Result<Tx> {
        self.construct(req.into(), opts).await
    }

    pub async fn construct_modify_order_tx(
        &self,
        req: ModifyOrderTxReq,
        opts: TransactOpts,
    ) -> Result<Tx> {
        self.construct(req.into(), opts).await
    }

    pub async fn construct_create_grouped_orders_tx(
        &self,
        req: CreateGroupedOrdersTxReq,
        opts: TransactOpts,
    ) -> Result<Tx> {
        self.construct(req.into(), opts).await
    }

    pub async fn construct_transfer_tx(&self, req: TransferTxReq, opts: TransactOpts) -> Result<Tx> {
        self.construct(req.into(), opts).await
    }

    pub async fn construct_withdraw_tx(&self, req: WithdrawTxReq, opts: TransactOpts) -> Result<Tx> {
        self.construct(req.into(), opts).await
    }

    async fn construct(&self, body: TxBody, opts: TransactOpts) -> Result<Tx> {
        let expired_at = match opts.expired_at {
            Some(expired_at) => expired_at,
            None => self.default_expiry()?,
        };

        // Nonce is filled in once validation has passed.
        let mut envelope = TxEnvelope {
            body,
            account_index: opts.from_account_index,
            api_key_index: opts.api_key_index,
            nonce: 0,
            expired_at,
        };
        envelope.validate()?;

        let lease = match opts.nonce {
            Some(nonce) => {
                envelope.nonce = nonce;
                None
            }
            None => {
                envelope.nonce = self
                    .nonces
                    .next_nonce(opts.from_account_index, opts.api_key_index)
                    .await?;
                Some(NonceLease {
                    nonces: Arc::clone(&self.nonces),
                    account_index: opts.from_account_index,
                    api_key_index: opts.api_key_index,
                    nonce: envelope.nonce,
                    armed: true,
                })
            }
        };

        let tx_type = envelope.tx_type();
        let nonce = envelope.nonce;

        // Dropping `lease` while armed (signing error, or this future being
        // cancelled mid-sign) hands the nonce back.
        match self.sign(envelope).await {
            Ok(tx) => {
                if let Some(mut lease) = lease {
                    lease.armed = false;
                }
                info!(
                    tx_type = %tx_type,
                    account_index = opts.from_account_index,
                    api_key_index = opts.api_key_index,
                    nonce,
                    tx_hash = %tx.tx_hash(),
                    "Transaction signed"
                );
                Ok(tx)
            }
            Err(e) => {
                warn!(
                    tx_type = %tx_type,
                    account_index = opts.from_account_index,
                    nonce,
                    error = %e,
                    "Transaction signing failed"
                );
                drop(lease);
                Err(e)
            }
        }
    }

    async fn sign(&self, envelope: TxEnvelope) -> Result<Tx> {
        let hash = envelope.hash(self.domain_separator);
        debug!(tx_hash = %hash, nonce = envelope.nonce, "Signing transaction hash");

        let signer = self.keys.signer_for(envelope.api_key_index);
        let signature = signer.sign(&hash).await?;
        if signature.len() != SIGNATURE_LEN {
            return Err(Error::Signing {
                message: format!(
                    "Signer returned {} bytes, expected {}",
                    signature.len(),
                    SIGNATURE_LEN
                ),
            });
        }

        Tx::assemble(envelope, hash, signature, self.domain_separator)
    }

    #[allow(clippy::result_large_err)]
    fn default_expiry(&self) -> Result<u64> {
        let window = chrono::Duration::from_std(self.tx_expiry)
            .map_err(|e| Error::config(format!("Invalid transaction expiry window: {}", e)))?;
        let expired_at = (Utc::now() + window).timestamp_millis();
        u64::try_from(expired_at)
            .map_err(|_| Error::config(format!("Expiry {} is before the unix epoch", expired_at)))
    }
}

/// A tracker-issued nonce not yet carried by a signed transaction.
struct NonceLease {
    nonces: Arc<NonceTracker>,
    account_index: u64,
    api_key_index: u8,
    nonce: u64,
    armed: bool,
}

impl Drop for NonceLease {
    fn drop(&mut self) {
        if self.armed {
            self.nonces
                .release_now(self.account_index, self.api_key_index, self.nonce);
        }
    }
}

impl std::fmt::Debug for TransactionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionBuilder")
            .field("keys", &self.keys)
            .field("domain_separator", &self.domain_separator)
            .field("tx_expiry", &self.tx_expiry)
            .finish()
    }
}
