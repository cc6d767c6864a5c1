//! Validation and canonical encoding for USDC movements.

use alloy_primitives::{keccak256, B256, U256};
use alloy_sol_types::SolValue;

use crate::types::{TransferTxReq, WithdrawTxReq};
use crate::{Error, Result};

/// Largest USDC amount in base units the exchange accepts.
pub const MAX_USDC_AMOUNT: u64 = i64::MAX as u64;

pub const TRANSFER_TYPE: &str = "Transfer(uint64 toAccountIndex,uint64 usdcAmount)";

pub const WITHDRAW_TYPE: &str = "Withdraw(uint64 usdcAmount)";

fn check_usdc_amount(amount: u64) -> Result<()> {
    if amount == 0 {
        return Err(Error::validation("usdc_amount", "must be > 0"));
    }
    if amount > MAX_USDC_AMOUNT {
        return Err(Error::validation(
            "usdc_amount",
            format!("must be <= {}, got {}", MAX_USDC_AMOUNT, amount),
        ));
    }
    Ok(())
}

impl TransferTxReq {
    /// A transfer needs the sending account to rule out self-transfers.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self, from_account_index: u64) -> Result<()> {
        check_usdc_amount(self.usdc_amount)?;
        if self.to_account_index == from_account_index {
            return Err(Error::validation(
                "to_account_index",
                format!("cannot transfer to the sending account {}", from_account_index),
            ));
        }
        Ok(())
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        (
            keccak256(TRANSFER_TYPE.as_bytes()),
            U256::from(self.to_account_index),
            U256::from(self.usdc_amount),
        )
            .abi_encode_packed()
    }

    pub fn struct_hash(&self) -> B256 {
        keccak256(self.encode())
    }
}

impl WithdrawTxReq {
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        check_usdc_amount(self.usdc_amount)
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        (
            keccak256(WITHDRAW_TYPE.as_bytes()),
            U256::from(self.usdc_amount),
        )
            .abi_encode_packed()
    }

    pub fn struct_hash(&self) -> B256 {
        keccak256(self.encode())
    }
}
