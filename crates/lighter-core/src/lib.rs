//! Lighter Core Library
//!
//! Transaction model, nonce tracking, signing and transport for the Lighter
//! exchange. Start with [`LighterClient`]; drop down to
//! [`TransactionBuilder`] when you bring your own transport.

pub mod api;
pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod nonce;
pub mod signing;
pub mod tx;
pub mod types;

pub use builder::TransactionBuilder;
pub use client::{LighterClient, LighterClientBuilder};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use nonce::{NonceSource, NonceTracker};
pub use signing::{KeyManager, LocalSigner, TxSigner};
pub use tx::{Tx, TxBody};
