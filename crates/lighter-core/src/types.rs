//! Core domain types for the Lighter SDK.

pub mod amount;
pub mod order;
pub mod tx;

pub use amount::*;
pub use order::*;
pub use tx::*;
