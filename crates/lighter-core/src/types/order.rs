//! Order-related request types and protocol enums.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Error;

/// Kind of order. Determines which of price / trigger price are mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OrderType {
    #[default]
    Limit = 0,
    Market = 1,
    StopLoss = 2,
    StopLossLimit = 3,
    TakeProfit = 4,
    TakeProfitLimit = 5,
}

impl OrderType {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Stop-loss and take-profit variants activate at a trigger price.
    pub fn is_trigger(&self) -> bool {
        matches!(
            self,
            OrderType::StopLoss
                | OrderType::StopLossLimit
                | OrderType::TakeProfit
                | OrderType::TakeProfitLimit
        )
    }
}

impl From<OrderType> for u8 {
    fn from(value: OrderType) -> Self {
        value.as_u8()
    }
}

impl TryFrom<u8> for OrderType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OrderType::Limit),
            1 => Ok(OrderType::Market),
            2 => Ok(OrderType::StopLoss),
            3 => Ok(OrderType::StopLossLimit),
            4 => Ok(OrderType::TakeProfit),
            5 => Ok(OrderType::TakeProfitLimit),
            other => Err(Error::validation(
                "type",
                format!("unknown order type {}", other),
            )),
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Market => write!(f, "MARKET"),
            OrderType::StopLoss => write!(f, "STOP_LOSS"),
            OrderType::StopLossLimit => write!(f, "STOP_LOSS_LIMIT"),
            OrderType::TakeProfit => write!(f, "TAKE_PROFIT"),
            OrderType::TakeProfitLimit => write!(f, "TAKE_PROFIT_LIMIT"),
        }
    }
}

/// Order time in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TimeInForce {
    ImmediateOrCancel = 0,
    #[default]
    GoodTillTime = 1,
    PostOnly = 2,
}

impl TimeInForce {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl From<TimeInForce> for u8 {
    fn from(value: TimeInForce) -> Self {
        value.as_u8()
    }
}

impl TryFrom<u8> for TimeInForce {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TimeInForce::ImmediateOrCancel),
            1 => Ok(TimeInForce::GoodTillTime),
            2 => Ok(TimeInForce::PostOnly),
            other => Err(Error::validation(
                "time_in_force",
                format!("unknown time in force {}", other),
            )),
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeInForce::ImmediateOrCancel => write!(f, "IMMEDIATE_OR_CANCEL"),
            TimeInForce::GoodTillTime => write!(f, "GOOD_TILL_TIME"),
            TimeInForce::PostOnly => write!(f, "POST_ONLY"),
        }
    }
}

/// Policy linking the orders of a grouped-orders transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum GroupingType {
    /// The first order, once filled, places the second.
    OneTriggersTheOther = 1,
    /// Filling either order cancels the other.
    OneCancelsTheOther = 2,
    /// The first order, once filled, places an OCO pair.
    OneTriggersAOneCancelsTheOther = 3,
}

impl GroupingType {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl From<GroupingType> for u8 {
    fn from(value: GroupingType) -> Self {
        value.as_u8()
    }
}

impl TryFrom<u8> for GroupingType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(GroupingType::OneTriggersTheOther),
            2 => Ok(GroupingType::OneCancelsTheOther),
            3 => Ok(GroupingType::OneTriggersAOneCancelsTheOther),
            other => Err(Error::validation(
                "grouping_type",
                format!("unknown grouping type {}", other),
            )),
        }
    }
}

/// Serialize booleans as `0`/`1`, the way the exchange expects them.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(serde::de::Error::custom(format!(
                "expected 0 or 1, got {}",
                other
            ))),
        }
    }
}

/// Request to place a new order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateOrderTxReq {
    pub market_index: u16,
    /// Caller-chosen id, unique per account, used to cancel or modify later.
    pub client_order_index: u64,
    /// Size in the market's smallest base unit.
    pub base_amount: u64,
    /// Price in the market's smallest price unit. Zero for market orders.
    pub price: u32,
    #[serde(with = "flag")]
    pub is_ask: bool,
    #[serde(rename = "Type")]
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    #[serde(with = "flag")]
    pub reduce_only: bool,
    pub trigger_price: u32,
    /// Unix milliseconds, 0 for none.
    pub order_expiry: u64,
}

/// Request to cancel a resting order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CancelOrderTxReq {
    pub market_index: u16,
    /// Client order index or exchange-assigned order index.
    pub index: u64,
}

/// Full replacement of the mutable fields of a resting order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyOrderTxReq {
    pub market_index: u16,
    pub index: u64,
    pub base_amount: u64,
    pub price: u32,
    pub trigger_price: u32,
}

/// Several orders submitted atomically under one grouping policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateGroupedOrdersTxReq {
    pub grouping_type: GroupingType,
    /// Order matters: the first entry of an OTO group is the trigger leg.
    pub orders: Vec<CreateOrderTxReq>,
}
