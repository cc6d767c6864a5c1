//! Signed, immutable transactions.

use alloy_primitives::{Address, B256};

use super::{TxBody, TxEnvelope};
use crate::signing::verify_signature;
use crate::types::TxType;
use crate::{Error, Result};

/// A signed transaction ready for submission.
///
/// Fields are fixed at construction. Inspection methods never mutate and
/// return the same answer every time they are called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    envelope: TxEnvelope,
    tx_info: String,
    signature: Vec<u8>,
    hash: B256,
    domain_separator: B256,
}

impl Tx {
    #[allow(clippy::result_large_err)]
    pub(crate) fn assemble(
        envelope: TxEnvelope,
        hash: B256,
        signature: Vec<u8>,
        domain_separator: B256,
    ) -> Result<Self> {
        let tx_info = envelope.tx_info(&signature)?;
        Ok(Self {
            envelope,
            tx_info,
            signature,
            hash,
            domain_separator,
        })
    }

    pub fn tx_type(&self) -> TxType {
        self.envelope.tx_type()
    }

    /// JSON payload submitted as `tx_info`.
    pub fn tx_info(&self) -> &str {
        &self.tx_info
    }

    /// `0x`-prefixed hex transaction hash.
    pub fn tx_hash(&self) -> String {
        format!("{:#x}", self.hash)
    }

    pub fn hash(&self) -> B256 {
        self.hash
    }

    pub fn body(&self) -> &TxBody {
        &self.envelope.body
    }

    pub fn account_index(&self) -> u64 {
        self.envelope.account_index
    }

    pub fn api_key_index(&self) -> u8 {
        self.envelope.api_key_index
    }

    pub fn nonce(&self) -> u64 {
        self.envelope.nonce
    }

    pub fn expired_at(&self) -> u64 {
        self.envelope.expired_at
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Re-check the payload: decode `tx_info`, re-run every invariant and
    /// confirm the stored hash matches a fresh computation.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        let (decoded, signature) = TxEnvelope::from_tx_info(self.tx_type(), &self.tx_info)?;
        decoded.validate()?;

        if decoded != self.envelope || signature != self.signature {
            return Err(Error::validation(
                "tx_info",
                "payload does not match the transaction fields",
            ));
        }

        let recomputed = decoded.hash(self.domain_separator);
        if recomputed != self.hash {
            return Err(Error::validation(
                "hash",
                format!("stored {} but payload hashes to {:#x}", self.tx_hash(), recomputed),
            ));
        }

        Ok(())
    }

    /// True when the signature over the hash recovers to `identity`.
    pub fn verify(&self, identity: &Address) -> bool {
        verify_signature(&self.signature, &self.hash, identity)
    }
}
