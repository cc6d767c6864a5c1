//! Transaction discriminators, fund movement requests and per-call options.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Error;

/// Discriminator sent alongside every transaction payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TxType {
    Transfer = 12,
    Withdraw = 13,
    CreateOrder = 14,
    CancelOrder = 15,
    ModifyOrder = 17,
    CreateGroupedOrders = 28,
}

impl TxType {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl From<TxType> for u8 {
    fn from(value: TxType) -> Self {
        value.as_u8()
    }
}

impl TryFrom<u8> for TxType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            12 => Ok(TxType::Transfer),
            13 => Ok(TxType::Withdraw),
            14 => Ok(TxType::CreateOrder),
            15 => Ok(TxType::CancelOrder),
            17 => Ok(TxType::ModifyOrder),
            28 => Ok(TxType::CreateGroupedOrders),
            other => Err(Error::validation(
                "tx_type",
                format!("unknown transaction type {}", other),
            )),
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxType::Transfer => write!(f, "Transfer"),
            TxType::Withdraw => write!(f, "Withdraw"),
            TxType::CreateOrder => write!(f, "CreateOrder"),
            TxType::CancelOrder => write!(f, "CancelOrder"),
            TxType::ModifyOrder => write!(f, "ModifyOrder"),
            TxType::CreateGroupedOrders => write!(f, "CreateGroupedOrders"),
        }
    }
}

/// USDC transfer between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransferTxReq {
    pub to_account_index: u64,
    /// Amount in USDC base units (6 decimals).
    #[serde(rename = "USDCAmount")]
    pub usdc_amount: u64,
}

/// USDC withdrawal to the account's registered L1 address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WithdrawTxReq {
    #[serde(rename = "USDCAmount")]
    pub usdc_amount: u64,
}

/// Who authorizes a transaction and how it is sequenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactOpts {
    pub from_account_index: u64,
    /// Selects which of the account's api keys signs this transaction.
    pub api_key_index: u8,
    /// Explicit nonce. Used verbatim and never touches the nonce tracker.
    pub nonce: Option<u64>,
    /// Explicit transaction expiry in unix milliseconds.
    pub expired_at: Option<u64>,
}

impl TransactOpts {
    pub fn new(from_account_index: u64, api_key_index: u8) -> Self {
        Self {
            from_account_index,
            api_key_index,
            nonce: None,
            expired_at: None,
        }
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn with_expired_at(mut self, expired_at: u64) -> Self {
        self.expired_at = Some(expired_at);
        self
    }
}
