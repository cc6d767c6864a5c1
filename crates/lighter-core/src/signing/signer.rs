//! Transaction signers.
//!
//! The builder only sees the [`TxSigner`] capability (sign a hash, expose a
//! public identity), so a local key, a remote signing service or a hardware
//! module can be swapped in without touching the transaction model.

use alloy_primitives::{Address, Signature, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::str::FromStr;

use crate::{Error, Result};

/// Length of a recoverable secp256k1 signature (r ‖ s ‖ v).
pub const SIGNATURE_LEN: usize = 65;

/// Capability set required to authorize transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TxSigner: Send + Sync {
    /// Sign a 32-byte transaction hash.
    async fn sign(&self, hash: &B256) -> Result<Vec<u8>>;

    /// Identity the remote verifier recovers from a valid signature.
    fn public_identity(&self) -> Address;
}

/// Signer backed by an in-process secp256k1 private key.
#[derive(Clone)]
pub struct LocalSigner {
    signer: PrivateKeySigner,
}

impl LocalSigner {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Create a signer from a hex-encoded private key, optionally `0x`-prefixed.
    #[allow(clippy::result_large_err)]
    pub fn from_private_key(key: &str) -> Result<Self> {
        let key_clean = key.trim().trim_start_matches("0x");

        let signer = PrivateKeySigner::from_str(key_clean).map_err(|_| Error::Config {
            message: "Invalid private key format - expected 64 hex characters".to_string(),
        })?;

        Ok(Self { signer })
    }

    /// Create a signer from raw key bytes.
    #[allow(clippy::result_large_err)]
    pub fn from_bytes(key: &[u8]) -> Result<Self> {
        if key.len() != 32 {
            return Err(Error::Config {
                message: format!("Private key must be 32 bytes, got {}", key.len()),
            });
        }

        let signer =
            PrivateKeySigner::from_bytes(&B256::from_slice(key)).map_err(|e| Error::Config {
                message: format!("Invalid private key: {}", e),
            })?;

        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

#[async_trait]
impl TxSigner for LocalSigner {
    async fn sign(&self, hash: &B256) -> Result<Vec<u8>> {
        let signature = self
            .signer
            .sign_hash(hash)
            .await
            .map_err(|e| Error::Signing {
                message: format!("Failed to sign transaction hash: {}", e),
            })?;

        Ok(signature.as_bytes().to_vec())
    }

    fn public_identity(&self) -> Address {
        self.address()
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &format!("{}", self.address()))
            .finish()
    }
}

/// Check that `signature` over `hash` recovers to `identity`.
pub fn verify_signature(signature: &[u8], hash: &B256, identity: &Address) -> bool {
    if signature.len() != SIGNATURE_LEN {
        return false;
    }

    let Ok(signature) = Signature::from_raw(signature) else {
        return false;
    };

    signature
        .recover_address_from_prehash(hash)
        .map(|recovered| recovered == *identity)
        .unwrap_or(false)
}
