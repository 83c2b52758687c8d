//! Allocation entries and the list a tree is built from.
//!
//! The list is the single input of the engine. It is loaded once (from a
//! JSON fixture or the compiled-in storefront list) and treated as immutable.

use crate::bytes::Bytes32;
use crate::error::{AllowlistError, Result, validate_argument};
use crate::hashes::keccak256;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const DEFAULT_FIXTURE: &str = include_str!("../fixtures/allocations.json");

/// One `(address, tokenId) -> amount` grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationEntry {
    pub address: String,
    pub token_id: u64,
    pub amount: u64,
}

impl AllocationEntry {
    pub fn new(address: impl Into<String>, token_id: u64, amount: u64) -> Self {
        Self {
            address: address.into(),
            token_id,
            amount,
        }
    }

    /// Case-insensitive address and exact token id comparison. Surrounding
    /// whitespace and the `0x` prefix are ignored on both sides.
    #[must_use]
    pub fn matches(&self, address: &str, token_id: u64) -> bool {
        self.token_id == token_id
            && address_digits(&self.address).eq_ignore_ascii_case(address_digits(address))
    }

    pub fn parsed_address(&self) -> Result<Address> {
        parse_address(&self.address)
    }
}

fn address_digits(address: &str) -> &str {
    let trimmed = address.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

/// Parses a 20-byte hex account address, `0x` prefix optional.
pub fn parse_address(address: &str) -> Result<Address> {
    let digits = address_digits(address);
    if digits.len() != 40 {
        return Err(AllowlistError::InvalidAddress(address.to_string()));
    }
    digits
        .parse::<Address>()
        .map_err(|_| AllowlistError::InvalidAddress(address.to_string()))
}

/// Trimmed, lower-case, `0x`-prefixed form of a valid address.
pub fn canonical_address(address: &str) -> Result<String> {
    let parsed = parse_address(address)?;
    Ok(format!("0x{}", hex::encode(parsed.as_slice())))
}

/// Ordered, non-empty allocation list. Order is significant: leaf `i` of the
/// tree is entry `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationList {
    entries: Vec<AllocationEntry>,
}

impl AllocationList {
    /// Validates every entry and stores addresses in canonical form.
    pub fn new(mut entries: Vec<AllocationEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(AllowlistError::EmptyAllocations);
        }

        for (i, entry) in entries.iter_mut().enumerate() {
            entry.address = canonical_address(&entry.address)?;
            validate_argument(
                entry.amount > 0,
                format!(
                    "entry {i} ({}, token {}) has zero amount",
                    entry.address, entry.token_id
                ),
            )?;
        }

        Ok(Self { entries })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<AllocationEntry> =
            serde_json::from_str(json).map_err(|e| AllowlistError::Fixture(e.to_string()))?;
        Self::new(entries)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| AllowlistError::Fixture(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// The storefront's example allocation list.
    pub fn default_fixture() -> Result<Self> {
        Self::from_json_str(DEFAULT_FIXTURE)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[AllocationEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &AllocationEntry> {
        self.entries.iter()
    }

    /// First entry granting `token_id` to `address`.
    pub fn find(&self, address: &str, token_id: u64) -> Option<(usize, &AllocationEntry)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.matches(address, token_id))
    }

    /// `(address, tokenId)` pairs granted more than once, in first-seen order.
    /// Lookups only ever see the first of these.
    pub fn duplicates(&self) -> Vec<(String, u64)> {
        let mut seen: HashMap<(String, u64), usize> = HashMap::new();
        let mut dupes = Vec::new();
        for entry in &self.entries {
            let key = (entry.address.to_ascii_lowercase(), entry.token_id);
            let count = seen.entry(key.clone()).or_insert(0);
            *count += 1;
            if *count == 2 {
                dupes.push(key);
            }
        }
        dupes
    }

    /// Content hash of the list, used to key cached trees.
    pub fn fingerprint(&self) -> Bytes32 {
        let mut canonical = Vec::with_capacity(self.entries.len() * 64);
        for entry in &self.entries {
            canonical.extend_from_slice(entry.address.to_ascii_lowercase().as_bytes());
            canonical.push(b':');
            canonical.extend_from_slice(entry.token_id.to_string().as_bytes());
            canonical.push(b':');
            canonical.extend_from_slice(entry.amount.to_string().as_bytes());
            canonical.push(b'\n');
        }
        keccak256(&canonical)
    }
}

impl<'a> IntoIterator for &'a AllocationList {
    type Item = &'a AllocationEntry;
    type IntoIter = std::slice::Iter<'a, AllocationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
