//! Validation and canonical encoding for order transactions.
//!
//! Each request encodes as `keccak256(type string)` followed by its fields,
//! every field left-padded to a 32-byte word. The layout is fixed by the
//! type string, so the encoding never depends on how the request was built.

use alloy_primitives::{keccak256, B256, U256};
use alloy_sol_types::SolValue;

use crate::types::{
    CancelOrderTxReq, CreateGroupedOrdersTxReq, CreateOrderTxReq, GroupingType, ModifyOrderTxReq,
    OrderType, TimeInForce,
};
use crate::{Error, Result};

/// Largest client order index the exchange accepts (2^48 - 1).
pub const MAX_CLIENT_ORDER_INDEX: u64 = (1 << 48) - 1;

/// Largest order index (client or exchange assigned).
pub const MAX_ORDER_INDEX: u64 = i64::MAX as u64;

/// Largest order size in base units (2^48 - 1).
pub const MAX_BASE_AMOUNT: u64 = (1 << 48) - 1;

pub const CREATE_ORDER_TYPE: &str = "CreateOrder(uint16 marketIndex,uint64 clientOrderIndex,uint64 baseAmount,uint32 price,uint8 isAsk,uint8 orderType,uint8 timeInForce,uint8 reduceOnly,uint32 triggerPrice,uint64 orderExpiry)";

pub const CANCEL_ORDER_TYPE: &str = "CancelOrder(uint16 marketIndex,uint64 index)";

pub const MODIFY_ORDER_TYPE: &str =
    "ModifyOrder(uint16 marketIndex,uint64 index,uint64 baseAmount,uint32 price,uint32 triggerPrice)";

/// Referenced struct types are appended, as in EIP-712 `encodeType`.
pub const CREATE_GROUPED_ORDERS_TYPE: &str = "CreateGroupedOrders(uint8 groupingType,CreateOrder[] orders)CreateOrder(uint16 marketIndex,uint64 clientOrderIndex,uint64 baseAmount,uint32 price,uint8 isAsk,uint8 orderType,uint8 timeInForce,uint8 reduceOnly,uint32 triggerPrice,uint64 orderExpiry)";

fn check_base_amount(base_amount: u64) -> Result<()> {
    if base_amount == 0 {
        return Err(Error::validation("base_amount", "must be > 0"));
    }
    if base_amount > MAX_BASE_AMOUNT {
        return Err(Error::validation(
            "base_amount",
            format!("must be <= {}, got {}", MAX_BASE_AMOUNT, base_amount),
        ));
    }
    Ok(())
}

fn check_order_index(index: u64) -> Result<()> {
    if index > MAX_ORDER_INDEX {
        return Err(Error::validation(
            "index",
            format!("must be <= {}, got {}", MAX_ORDER_INDEX, index),
        ));
    }
    Ok(())
}

impl CreateOrderTxReq {
    /// Check every field invariant. Nothing is coerced.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        check_base_amount(self.base_amount)?;

        if self.client_order_index > MAX_CLIENT_ORDER_INDEX {
            return Err(Error::validation(
                "client_order_index",
                format!(
                    "must be <= {}, got {}",
                    MAX_CLIENT_ORDER_INDEX, self.client_order_index
                ),
            ));
        }

        if self.order_type == OrderType::Market {
            if self.price != 0 {
                return Err(Error::validation(
                    "price",
                    format!("must be 0 for market order, got {}", self.price),
                ));
            }
            if self.time_in_force != TimeInForce::ImmediateOrCancel {
                return Err(Error::validation(
                    "time_in_force",
                    format!(
                        "market order requires {}, got {}",
                        TimeInForce::ImmediateOrCancel,
                        self.time_in_force
                    ),
                ));
            }
        } else if self.price == 0 {
            return Err(Error::validation("price", "must be > 0 for non-market order"));
        }

        if self.order_type.is_trigger() {
            if self.trigger_price == 0 {
                return Err(Error::validation(
                    "trigger_price",
                    format!("must be > 0 for {} order", self.order_type),
                ));
            }
        } else if self.trigger_price != 0 {
            return Err(Error::validation(
                "trigger_price",
                format!("must be 0 for {} order, got {}", self.order_type, self.trigger_price),
            ));
        }

        Ok(())
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        (
            keccak256(CREATE_ORDER_TYPE.as_bytes()),
            U256::from(self.market_index),
            U256::from(self.client_order_index),
            U256::from(self.base_amount),
            U256::from(self.price),
            U256::from(u8::from(self.is_ask)),
            U256::from(self.order_type.as_u8()),
            U256::from(self.time_in_force.as_u8()),
            U256::from(u8::from(self.reduce_only)),
            U256::from(self.trigger_price),
            U256::from(self.order_expiry),
        )
            .abi_encode_packed()
    }

    pub fn struct_hash(&self) -> B256 {
        keccak256(self.encode())
    }
}

impl CancelOrderTxReq {
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        check_order_index(self.index)
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        (
            keccak256(CANCEL_ORDER_TYPE.as_bytes()),
            U256::from(self.market_index),
            U256::from(self.index),
        )
            .abi_encode_packed()
    }

    pub fn struct_hash(&self) -> B256 {
        keccak256(self.encode())
    }
}

impl ModifyOrderTxReq {
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        check_order_index(self.index)?;
        check_base_amount(self.base_amount)?;
        if self.price == 0 {
            return Err(Error::validation("price", "must be > 0"));
        }
        Ok(())
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        (
            keccak256(MODIFY_ORDER_TYPE.as_bytes()),
            U256::from(self.market_index),
            U256::from(self.index),
            U256::from(self.base_amount),
            U256::from(self.price),
            U256::from(self.trigger_price),
        )
            .abi_encode_packed()
    }

    pub fn struct_hash(&self) -> B256 {
        keccak256(self.encode())
    }
}

impl CreateGroupedOrdersTxReq {
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        let count = self.orders.len();
        let count_ok = match self.grouping_type {
            GroupingType::OneCancelsTheOther => count >= 2,
            GroupingType::OneTriggersTheOther => count == 2,
            GroupingType::OneTriggersAOneCancelsTheOther => count == 3,
        };
        if !count_ok {
            return Err(Error::validation(
                "orders",
                format!(
                    "{:?} group cannot hold {} order(s)",
                    self.grouping_type, count
                ),
            ));
        }

        for (i, order) in self.orders.iter().enumerate() {
            order.validate().map_err(|e| match e {
                Error::Validation { field, reason } => Error::Validation {
                    field,
                    reason: format!("orders[{}]: {}", i, reason),
                },
                other => other,
            })?;
        }

        let market_index = self.orders[0].market_index;
        if let Some(stray) = self.orders.iter().find(|o| o.market_index != market_index) {
            return Err(Error::validation(
                "market_index",
                format!(
                    "all orders in a group must share market {}, found {}",
                    market_index, stray.market_index
                ),
            ));
        }

        Ok(())
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        // Sub-orders hash in the given sequence; never sorted.
        let order_hashes: Vec<u8> = self
            .orders
            .iter()
            .flat_map(|order| order.struct_hash().0)
            .collect();

        (
            keccak256(CREATE_GROUPED_ORDERS_TYPE.as_bytes()),
            U256::from(self.grouping_type.as_u8()),
            keccak256(&order_hashes),
        )
            .abi_encode_packed()
    }

    pub fn struct_hash(&self) -> B256 {
        keccak256(self.encode())
    }
}
