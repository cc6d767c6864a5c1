//! Lighter SDK
//!
//! Root crate for integration tests, benchmarks and demos. The
//! implementation lives in `lighter-core`:
//!
//! - `types`: order, transfer and withdraw requests plus per-call options
//! - `tx`: validation, canonical encoding and signed transactions
//! - `nonce`: per-(account, api key) nonce sequencing
//! - `signing`: domain separation, signers and key selection
//! - `api`: transport trait and HTTP client
//! - `client`: `LighterClient` facade

pub use lighter_core as core;
pub use lighter_core::*;
