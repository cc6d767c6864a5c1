//! Signing module for Lighter transactions.
//!
//! # Architecture
//!
//! ```text
//! KeyManager ── api_key_index ──► TxSigner (LocalSigner, remote, ...)
//!                                      │
//!     TxDomain ── separator ──┐        │ sign(hash)
//!                             ▼        ▼
//!               typed_data_hash(envelope) ──► Tx
//! ```

pub mod domain;
pub mod key_manager;
pub mod signer;

pub use domain::{typed_data_hash, TxDomain, DOMAIN_NAME, DOMAIN_VERSION};
pub use key_manager::{KeyManager, PRIVATE_KEY_ENV};
pub use signer::{verify_signature, LocalSigner, TxSigner, SIGNATURE_LEN};

#[cfg(test)]
pub use signer::MockTxSigner;
