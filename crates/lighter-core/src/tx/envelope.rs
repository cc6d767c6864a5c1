//! Transaction envelope: a body plus the account, key, nonce and expiry
//! that authorize it.

use alloy_primitives::{keccak256, B256, U256};
use alloy_sol_types::SolValue;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::TxBody;
use crate::signing::typed_data_hash;
use crate::types::TxType;
use crate::{Error, Result};

/// Api key index 255 is reserved by the exchange.
pub const MAX_API_KEY_INDEX: u8 = 254;

pub const ENVELOPE_TYPE: &str = "Envelope(uint8 txType,uint64 accountIndex,uint8 apiKeyIndex,uint64 nonce,uint64 expiredAt,bytes32 body)";

/// Everything that gets hashed and signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxEnvelope {
    pub body: TxBody,
    pub account_index: u64,
    pub api_key_index: u8,
    pub nonce: u64,
    /// Unix milliseconds after which the exchange drops the transaction.
    pub expired_at: u64,
}

/// Envelope keys stored next to the body fields in `tx_info`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TxInfoHeader {
    account_index: u64,
    api_key_index: u8,
    nonce: u64,
    expired_at: u64,
    sig: String,
}

impl TxEnvelope {
    pub fn tx_type(&self) -> TxType {
        self.body.tx_type()
    }

    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.api_key_index > MAX_API_KEY_INDEX {
            return Err(Error::validation(
                "api_key_index",
                format!(
                    "must be <= {}, got {}",
                    MAX_API_KEY_INDEX, self.api_key_index
                ),
            ));
        }
        if self.expired_at == 0 {
            return Err(Error::validation("expired_at", "must be > 0"));
        }
        self.body.validate(self.account_index)
    }

    /// Canonical byte payload. Same logical fields, same bytes.
    pub fn canonical_payload(&self) -> Vec<u8> {
        (
            keccak256(ENVELOPE_TYPE.as_bytes()),
            U256::from(self.tx_type().as_u8()),
            U256::from(self.account_index),
            U256::from(self.api_key_index),
            U256::from(self.nonce),
            U256::from(self.expired_at),
            self.body.struct_hash(),
        )
            .abi_encode_packed()
    }

    /// Transaction hash under the given domain separator.
    pub fn hash(&self, domain_separator: B256) -> B256 {
        typed_data_hash(domain_separator, keccak256(self.canonical_payload()))
    }

    /// JSON submission payload: body fields flattened next to the envelope
    /// fields and the hex signature. Keys are emitted in sorted order.
    #[allow(clippy::result_large_err)]
    pub fn tx_info(&self, signature: &[u8]) -> Result<String> {
        let Value::Object(fields) = serde_json::to_value(&self.body)? else {
            return Err(Error::Json(serde::ser::Error::custom(
                "transaction body must serialize to an object",
            )));
        };

        let mut info: BTreeMap<String, Value> = fields.into_iter().collect();
        info.insert("AccountIndex".to_string(), self.account_index.into());
        info.insert("ApiKeyIndex".to_string(), self.api_key_index.into());
        info.insert("ExpiredAt".to_string(), self.expired_at.into());
        info.insert("Nonce".to_string(), self.nonce.into());
        info.insert(
            "Sig".to_string(),
            format!("0x{}", hex::encode(signature)).into(),
        );

        Ok(serde_json::to_string(&info)?)
    }

    /// Decode an envelope and its signature from a `tx_info` payload.
    #[allow(clippy::result_large_err)]
    pub fn from_tx_info(tx_type: TxType, tx_info: &str) -> Result<(Self, Vec<u8>)> {
        let value: Value = serde_json::from_str(tx_info)?;
        let header: TxInfoHeader = serde_json::from_value(value.clone())?;
        let body = TxBody::from_json(tx_type, value)?;

        let signature = hex::decode(header.sig.trim_start_matches("0x"))
            .map_err(|e| Error::validation("sig", format!("invalid hex: {}", e)))?;

        let envelope = Self {
            body,
            account_index: header.account_index,
            api_key_index: header.api_key_index,
            nonce: header.nonce,
            expired_at: header.expired_at,
        };

        Ok((envelope, signature))
    }
}
