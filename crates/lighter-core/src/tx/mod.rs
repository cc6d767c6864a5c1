//! Transaction model.
//!
//! ```text
//! CreateOrderTxReq ─┐
//! CancelOrderTxReq ─┤
//! ModifyOrderTxReq ─┼─► TxBody ─► TxEnvelope ─► hash ─► sign ─► Tx
//! ...               ─┘            (account, key,
//!                                  nonce, expiry)
//! ```
//!
//! Encoding and hashing here are pure functions of their inputs. Nonces,
//! clocks and keys are resolved by the builder before anything reaches
//! this module.

pub mod envelope;
pub mod funds;
pub mod order;
pub mod signed;

pub use envelope::{TxEnvelope, ENVELOPE_TYPE, MAX_API_KEY_INDEX};
pub use funds::MAX_USDC_AMOUNT;
pub use order::{MAX_BASE_AMOUNT, MAX_CLIENT_ORDER_INDEX, MAX_ORDER_INDEX};
pub use signed::Tx;

use alloy_primitives::B256;
use serde::Serialize;
use serde_json::Value;

use crate::types::{
    CancelOrderTxReq, CreateGroupedOrdersTxReq, CreateOrderTxReq, ModifyOrderTxReq, TransferTxReq,
    TxType, WithdrawTxReq,
};
use crate::Result;

/// Closed set of transaction bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TxBody {
    CreateOrder(CreateOrderTxReq),
    CancelOrder(CancelOrderTxReq),
    ModifyOrder(ModifyOrderTxReq),
    CreateGroupedOrders(CreateGroupedOrdersTxReq),
    Transfer(TransferTxReq),
    Withdraw(WithdrawTxReq),
}

impl TxBody {
    pub fn tx_type(&self) -> TxType {
        match self {
            TxBody::CreateOrder(_) => TxType::CreateOrder,
            TxBody::CancelOrder(_) => TxType::CancelOrder,
            TxBody::ModifyOrder(_) => TxType::ModifyOrder,
            TxBody::CreateGroupedOrders(_) => TxType::CreateGroupedOrders,
            TxBody::Transfer(_) => TxType::Transfer,
            TxBody::Withdraw(_) => TxType::Withdraw,
        }
    }

    /// Check the body's invariants. `account_index` is the sending account.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self, account_index: u64) -> Result<()> {
        match self {
            TxBody::CreateOrder(req) => req.validate(),
            TxBody::CancelOrder(req) => req.validate(),
            TxBody::ModifyOrder(req) => req.validate(),
            TxBody::CreateGroupedOrders(req) => req.validate(),
            TxBody::Transfer(req) => req.validate(account_index),
            TxBody::Withdraw(req) => req.validate(),
        }
    }

    /// Canonical body encoding: type hash followed by one word per field.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            TxBody::CreateOrder(req) => req.encode(),
            TxBody::CancelOrder(req) => req.encode(),
            TxBody::ModifyOrder(req) => req.encode(),
            TxBody::CreateGroupedOrders(req) => req.encode(),
            TxBody::Transfer(req) => req.encode(),
            TxBody::Withdraw(req) => req.encode(),
        }
    }

    pub fn struct_hash(&self) -> B256 {
        alloy_primitives::keccak256(self.encode())
    }

    /// Decode a body of the given kind from its JSON object form.
    #[allow(clippy::result_large_err)]
    pub fn from_json(tx_type: TxType, value: Value) -> Result<Self> {
        let body = match tx_type {
            TxType::CreateOrder => TxBody::CreateOrder(serde_json::from_value(value)?),
            TxType::CancelOrder => TxBody::CancelOrder(serde_json::from_value(value)?),
            TxType::ModifyOrder => TxBody::ModifyOrder(serde_json::from_value(value)?),
            TxType::CreateGroupedOrders => {
                TxBody::CreateGroupedOrders(serde_json::from_value(value)?)
            }
            TxType::Transfer => TxBody::Transfer(serde_json::from_value(value)?),
            TxType::Withdraw => TxBody::Withdraw(serde_json::from_value(value)?),
        };
        Ok(body)
    }
}

impl From<CreateOrderTxReq> for TxBody {
    fn from(req: CreateOrderTxReq) -> Self {
        TxBody::CreateOrder(req)
    }
}

impl From<CancelOrderTxReq> for TxBody {
    fn from(req: CancelOrderTxReq) -> Self {
        TxBody::CancelOrder(req)
    }
}

impl From<ModifyOrderTxReq> for TxBody {
    fn from(req: ModifyOrderTxReq) -> Self {
        TxBody::ModifyOrder(req)
    }
}

impl From<CreateGroupedOrdersTxReq> for TxBody {
    fn from(req: CreateGroupedOrdersTxReq) -> Self {
        TxBody::CreateGroupedOrders(req)
    }
}

impl From<TransferTxReq> for TxBody {
    fn from(req: TransferTxReq) -> Self {
        TxBody::Transfer(req)
    }
}

impl From<WithdrawTxReq> for TxBody {
    fn from(req: WithdrawTxReq) -> Self {
        TxBody::Withdraw(req)
    }
}
