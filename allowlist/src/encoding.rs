//! Leaf encoders.
//!
//! A leaf is `keccak256(encode(entry))` for the plain schemes and a double
//! hash for the OpenZeppelin standard scheme. The byte layout must match the
//! verifying contract exactly; a mismatch produces proofs that verify here
//! and fail on-chain.

use crate::allocation::AllocationEntry;
use crate::bytes::Bytes32;
use crate::error::{AllowlistError, Result};
use crate::hashes::keccak256;
use alloy_primitives::U256;
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub trait LeafEncoder {
    /// Bytes fed to the leaf hash.
    fn encode(&self, entry: &AllocationEntry) -> Result<Vec<u8>>;

    fn leaf_hash(&self, entry: &AllocationEntry) -> Result<Bytes32> {
        Ok(keccak256(&self.encode(entry)?))
    }
}

/// `lowercase(address) ++ tokenId ++ amount` as UTF-8 decimal text, no separators.
/// This is what the storefront's whitelist route hashes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatEncoder;

impl LeafEncoder for ConcatEncoder {
    fn encode(&self, entry: &AllocationEntry) -> Result<Vec<u8>> {
        let mut out = entry.address.trim().to_ascii_lowercase();
        out.push_str(&entry.token_id.to_string());
        out.push_str(&entry.amount.to_string());
        Ok(out.into_bytes())
    }
}

/// `abi.encodePacked(address, uint256, uint256)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackedEncoder;

impl LeafEncoder for PackedEncoder {
    fn encode(&self, entry: &AllocationEntry) -> Result<Vec<u8>> {
        let address = entry.parsed_address()?;
        let mut out = Vec::with_capacity(20 + 32 + 32);
        out.extend(address.abi_encode_packed());
        out.extend(U256::from(entry.token_id).abi_encode_packed());
        out.extend(U256::from(entry.amount).abi_encode_packed());
        Ok(out)
    }
}

/// OpenZeppelin `StandardMerkleTree` leaf over `(address, uint256, uint256)`:
/// `keccak256(keccak256(abi.encode(...)))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEncoder;

impl LeafEncoder for StandardEncoder {
    fn encode(&self, entry: &AllocationEntry) -> Result<Vec<u8>> {
        let address = entry.parsed_address()?;
        let mut out = Vec::with_capacity(3 * 32);
        out.extend(address.abi_encode());
        out.extend(U256::from(entry.token_id).abi_encode());
        out.extend(U256::from(entry.amount).abi_encode());
        Ok(out)
    }

    fn leaf_hash(&self, entry: &AllocationEntry) -> Result<Bytes32> {
        Ok(keccak256(&keccak256(&self.encode(entry)?)))
    }
}

/// Selectable leaf encoding, so the byte layout can follow the deployed
/// contract without touching tree or proof code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingScheme {
    #[default]
    Concat,
    Packed,
    Standard,
}

impl EncodingScheme {
    pub const ALL: [EncodingScheme; 3] = [Self::Concat, Self::Packed, Self::Standard];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concat => "concat",
            Self::Packed => "packed",
            Self::Standard => "standard",
        }
    }
}

impl LeafEncoder for EncodingScheme {
    fn encode(&self, entry: &AllocationEntry) -> Result<Vec<u8>> {
        match self {
            Self::Concat => ConcatEncoder.encode(entry),
            Self::Packed => PackedEncoder.encode(entry),
            Self::Standard => StandardEncoder.encode(entry),
        }
    }

    fn leaf_hash(&self, entry: &AllocationEntry) -> Result<Bytes32> {
        match self {
            Self::Concat => ConcatEncoder.leaf_hash(entry),
            Self::Packed => PackedEncoder.leaf_hash(entry),
            Self::Standard => StandardEncoder.leaf_hash(entry),
        }
    }
}

impl fmt::Display for EncodingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncodingScheme {
    type Err = AllowlistError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AllowlistError::UnknownEncoding(s.to_string()))
    }
}
