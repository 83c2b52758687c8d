//! "Is this address whitelisted for this token?"
//!
//! [`AllowlistService`] owns the injected allocation list and answers queries
//! with a proof against the root of the whole list. Trees are cached per
//! `(list fingerprint, encoding)` and rebuilt only when the list changes.

use crate::allocation::{AllocationEntry, AllocationList, parse_address};
use crate::bytes::{Bytes32, HexString, bytes32_to_hex};
use crate::encoding::{EncodingScheme, LeafEncoder};
use crate::error::{AllowlistError, Result, invariant};
use crate::tree::AllowlistTree;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const NOT_WHITELISTED_MESSAGE: &str = "Address is not whitelisted for this token";

/// Result of a well-formed query. Absence from the list is an answer, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireOutcome", try_from = "WireOutcome")]
pub enum QueryOutcome {
    Found {
        amount: u64,
        proof: Vec<HexString>,
        root: HexString,
    },
    NotFound {
        message: String,
    },
}

impl QueryOutcome {
    #[must_use]
    pub fn is_whitelisted(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// `{ isWhitelisted, amount?, proof?, root?, message? }`, the shape the
/// storefront's mint flow reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireOutcome {
    is_whitelisted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    amount: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    proof: Option<Vec<HexString>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    root: Option<HexString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl From<QueryOutcome> for WireOutcome {
    fn from(outcome: QueryOutcome) -> Self {
        match outcome {
            QueryOutcome::Found {
                amount,
                proof,
                root,
            } => Self {
                is_whitelisted: true,
                amount: Some(amount),
                proof: Some(proof),
                root: Some(root),
                message: None,
            },
            QueryOutcome::NotFound { message } => Self {
                is_whitelisted: false,
                amount: None,
                proof: None,
                root: None,
                message: Some(message),
            },
        }
    }
}

impl TryFrom<WireOutcome> for QueryOutcome {
    type Error = String;

    fn try_from(wire: WireOutcome) -> std::result::Result<Self, Self::Error> {
        if !wire.is_whitelisted {
            return Ok(Self::NotFound {
                message: wire.message.unwrap_or_default(),
            });
        }
        match (wire.amount, wire.proof, wire.root) {
            (Some(amount), Some(proof), Some(root)) => Ok(Self::Found {
                amount,
                proof,
                root,
            }),
            _ => Err("whitelisted outcome requires amount, proof and root".to_string()),
        }
    }
}

struct CachedTree {
    fingerprint: Bytes32,
    encoding: EncodingScheme,
    tree: Arc<AllowlistTree>,
}

/// The current list and its fingerprint, swapped together.
struct Snapshot {
    allocations: Arc<AllocationList>,
    fingerprint: Bytes32,
}

impl Snapshot {
    fn new(allocations: AllocationList) -> Self {
        Self {
            fingerprint: allocations.fingerprint(),
            allocations: Arc::new(allocations),
        }
    }
}

pub struct AllowlistService {
    current: RwLock<Snapshot>,
    encoding: EncodingScheme,
    cache_trees: bool,
    cache: RwLock<Option<CachedTree>>,
}

impl AllowlistService {
    pub fn new(allocations: AllocationList, encoding: EncodingScheme) -> Self {
        let dupes = allocations.duplicates();
        if !dupes.is_empty() {
            warn!(?dupes, "allocation list has duplicate (address, tokenId) pairs; first match wins");
        }

        Self {
            current: RwLock::new(Snapshot::new(allocations)),
            encoding,
            cache_trees: true,
            cache: RwLock::new(None),
        }
    }

    /// Rebuild the tree on every query instead of caching it.
    pub fn with_tree_cache(mut self, enabled: bool) -> Self {
        self.cache_trees = enabled;
        self
    }

    pub fn encoding(&self) -> EncodingScheme {
        self.encoding
    }

    pub fn allocations(&self) -> Arc<AllocationList> {
        Arc::clone(&self.current.read().allocations)
    }

    /// Content hash of the current list, computed once per list.
    pub fn fingerprint(&self) -> Bytes32 {
        self.current.read().fingerprint
    }

    fn snapshot(&self) -> (Arc<AllocationList>, Bytes32) {
        let current = self.current.read();
        (Arc::clone(&current.allocations), current.fingerprint)
    }

    /// Swaps the allocation list. The cached tree is dropped.
    pub fn replace_allocations(&self, allocations: AllocationList) {
        info!(entries = allocations.len(), "replacing allocation list");
        let next = Snapshot::new(allocations);
        *self.current.write() = next;
        *self.cache.write() = None;
    }

    /// The tree over the current list, built on first use.
    pub fn tree(&self) -> Result<Arc<AllowlistTree>> {
        let (allocations, fingerprint) = self.snapshot();
        self.tree_for(&allocations, fingerprint)
    }

    fn tree_for(
        &self,
        allocations: &AllocationList,
        fingerprint: Bytes32,
    ) -> Result<Arc<AllowlistTree>> {
        if self.cache_trees {
            if let Some(cached) = self.cache.read().as_ref() {
                if cached.fingerprint == fingerprint && cached.encoding == self.encoding {
                    return Ok(Arc::clone(&cached.tree));
                }
            }
        }

        let tree = Arc::new(AllowlistTree::from_allocations(allocations, &self.encoding)?);
        debug!(
            entries = allocations.len(),
            depth = tree.depth(),
            root = %tree.root_hex(),
            "built allowlist tree"
        );

        if self.cache_trees {
            *self.cache.write() = Some(CachedTree {
                fingerprint,
                encoding: self.encoding,
                tree: Arc::clone(&tree),
            });
        }

        Ok(tree)
    }

    pub fn root(&self) -> Result<HexString> {
        Ok(self.tree()?.root_hex())
    }

    /// Answers a query from untrusted parameters. Missing or malformed
    /// parameters are bad-request errors; a missing allocation is
    /// [`QueryOutcome::NotFound`].
    pub fn query(&self, address: Option<&str>, token_id: Option<&str>) -> Result<QueryOutcome> {
        let address = required(address, "address")?;
        let token_id = required(token_id, "tokenId")?;

        parse_address(address)?;
        let token_id: u64 = token_id
            .parse()
            .map_err(|_| AllowlistError::InvalidTokenId(token_id.to_string()))?;

        self.lookup(address, token_id)
    }

    pub fn lookup(&self, address: &str, token_id: u64) -> Result<QueryOutcome> {
        let (allocations, fingerprint) = self.snapshot();

        let Some((index, entry)) = allocations.find(address, token_id) else {
            debug!(address, token_id, "not whitelisted");
            return Ok(QueryOutcome::NotFound {
                message: NOT_WHITELISTED_MESSAGE.to_string(),
            });
        };

        let tree = self.tree_for(&allocations, fingerprint)?;
        let leaf = self.encoding.leaf_hash(entry)?;
        invariant(
            tree.leaves().get(index) == Some(&leaf),
            "allocation leaf does not match tree",
        )?;

        let proof = tree.proof(index)?;
        invariant(
            AllowlistTree::verify(&tree.root(), &leaf, &proof),
            "derived proof does not reach the root",
        )?;

        debug!(address, token_id, amount = entry.amount, proof_len = proof.len(), "whitelisted");

        Ok(QueryOutcome::Found {
            amount: entry.amount,
            proof: proof.iter().map(bytes32_to_hex).collect(),
            root: tree.root_hex(),
        })
    }

    /// Checks a client-held proof for `entry` against the current root.
    pub fn verify_entry(&self, entry: &AllocationEntry, proof: &[HexString]) -> Result<bool> {
        let tree = self.tree()?;
        let leaf = self.encoding.leaf_hash(entry)?;
        AllowlistTree::verify_hex(&tree.root(), &leaf, proof)
    }
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AllowlistError::MissingParameter(name)),
    }
}
