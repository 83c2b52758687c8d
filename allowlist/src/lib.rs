//! # allowlist
//!
//! Merkle allowlist engine for RewardCrate ERC-1155 whitelist mints.
//!
//! An allocation list of `(address, tokenId, amount)` entries is hashed into
//! leaves, folded into a tree with sorted-pair keccak256 hashing (the
//! OpenZeppelin `MerkleProof` rule), and queried for inclusion proofs that
//! the mint contract checks against the published root.
//!
//! - [`AllocationList`]: the injected list a tree is built from
//! - [`LeafEncoder`] / [`EncodingScheme`]: the byte layout of a leaf
//! - [`AllowlistTree`]: layered tree, proofs, verification, dump/load
//! - [`AllowlistService`]: the "is this address whitelisted?" query
//!
//! ## Example
//!
//! ```rust
//! use allowlist::{AllocationEntry, AllocationList, AllowlistService, EncodingScheme, QueryOutcome};
//!
//! let list = AllocationList::new(vec![
//!     AllocationEntry::new("0x1111111111111111111111111111111111111111", 1, 2),
//!     AllocationEntry::new("0x2222222222222222222222222222222222222222", 1, 5),
//! ])
//! .unwrap();
//! let service = AllowlistService::new(list, EncodingScheme::Concat);
//!
//! let outcome = service
//!     .query(Some("0x1111111111111111111111111111111111111111"), Some("1"))
//!     .unwrap();
//! assert!(matches!(outcome, QueryOutcome::Found { amount: 2, .. }));
//! ```

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod allocation;
pub mod bytes;
pub mod config;
pub mod encoding;
pub mod error;
pub mod hashes;
pub mod query;
pub mod server;
pub mod tree;

pub use allocation::{AllocationEntry, AllocationList};
pub use bytes::{Bytes32, HexString, ToBytes32};
pub use config::AllowlistConfig;
pub use encoding::{ConcatEncoder, EncodingScheme, LeafEncoder, PackedEncoder, StandardEncoder};
pub use error::{AllowlistError, Result};
pub use hashes::{hash_pair, keccak256};
pub use query::{AllowlistService, QueryOutcome};
pub use tree::{AllowlistTree, AllowlistTreeData};
