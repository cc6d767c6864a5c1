//! Domain separation for Lighter transaction hashes.
//!
//! Every transaction hash is bound to a domain (protocol name, version and
//! chain id) so a transaction signed for one network can never be replayed
//! on another.

use alloy_primitives::{keccak256, B256, U256};
use alloy_sol_types::SolValue;

use crate::config::DEFAULT_CHAIN_ID;

pub const DOMAIN_NAME: &str = "Lighter";
pub const DOMAIN_VERSION: &str = "1";

/// Domain separator parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxDomain {
    pub name: String,
    pub version: String,
    pub chain_id: U256,
}

impl Default for TxDomain {
    fn default() -> Self {
        Self::for_chain(DEFAULT_CHAIN_ID)
    }
}

impl TxDomain {
    /// Create the Lighter domain for the given chain id.
    pub fn for_chain(chain_id: u64) -> Self {
        Self {
            name: DOMAIN_NAME.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id: U256::from(chain_id),
        }
    }

    /// Compute the domain separator hash.
    pub fn separator(&self) -> B256 {
        let domain_type_hash =
            keccak256(b"LighterDomain(string name,string version,uint256 chainId)");

        let name_hash = keccak256(self.name.as_bytes());
        let version_hash = keccak256(self.version.as_bytes());

        let encoded =
            (domain_type_hash, name_hash, version_hash, self.chain_id).abi_encode_packed();

        keccak256(&encoded)
    }
}

/// Bind a struct hash to a domain: `keccak256("\x19\x01" ++ separator ++ struct_hash)`.
pub fn typed_data_hash(domain_separator: B256, struct_hash: B256) -> B256 {
    let mut data = Vec::with_capacity(66);
    data.extend_from_slice(&[0x19, 0x01]);
    data.extend_from_slice(domain_separator.as_slice());
    data.extend_from_slice(struct_hash.as_slice());
    keccak256(&data)
}
