//! Signing key selection per api key index.
//!
//! A Lighter account can register several api keys. Each transaction names
//! the one that authorizes it through `TransactOpts::api_key_index`; the key
//! manager resolves that index to a signer, falling back to the default key.

use alloy_primitives::Address;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::signer::{LocalSigner, TxSigner};
use crate::{Error, Result};

/// Environment variable holding the default api private key.
pub const PRIVATE_KEY_ENV: &str = "LIGHTER_API_PRIVATE_KEY";

#[derive(Clone)]
pub struct KeyManager {
    default: Arc<dyn TxSigner>,
    keys: BTreeMap<u8, Arc<dyn TxSigner>>,
}

impl KeyManager {
    pub fn new(default: Arc<dyn TxSigner>) -> Self {
        Self {
            default,
            keys: BTreeMap::new(),
        }
    }

    /// Build a key manager around a hex-encoded private key.
    #[allow(clippy::result_large_err)]
    pub fn from_private_key(key: &str) -> Result<Self> {
        Ok(Self::new(Arc::new(LocalSigner::from_private_key(key)?)))
    }

    /// Load the default key from `LIGHTER_API_PRIVATE_KEY`.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let key = std::env::var(PRIVATE_KEY_ENV).map_err(|_| Error::Config {
            message: format!("{} environment variable not set", PRIVATE_KEY_ENV),
        })?;
        Self::from_private_key(&key)
    }

    /// Register a dedicated signer for one api key index.
    pub fn with_key(mut self, api_key_index: u8, signer: Arc<dyn TxSigner>) -> Self {
        self.keys.insert(api_key_index, signer);
        self
    }

    #[allow(clippy::result_large_err)]
    pub fn with_private_key(self, api_key_index: u8, key: &str) -> Result<Self> {
        let signer = LocalSigner::from_private_key(key)?;
        Ok(self.with_key(api_key_index, Arc::new(signer)))
    }

    /// Signer authorized for `api_key_index`.
    pub fn signer_for(&self, api_key_index: u8) -> Arc<dyn TxSigner> {
        self.keys
            .get(&api_key_index)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default))
    }

    pub fn public_identity(&self, api_key_index: u8) -> Address {
        self.signer_for(api_key_index).public_identity()
    }

    /// Api key indexes with a dedicated signer.
    pub fn registered_indexes(&self) -> Vec<u8> {
        self.keys.keys().copied().collect()
    }
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("default", &format!("{}", self.default.public_identity()))
            .field("registered_indexes", &self.registered_indexes())
            .finish()
    }
}
