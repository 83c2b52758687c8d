//! Layered Merkle tree over allocation leaves.
//!
//! Layer 0 holds the leaves in allocation order; each following layer hashes
//! sorted pairs `(2i, 2i + 1)` of the one below. An odd trailing node is
//! carried up unchanged rather than paired with itself, so
//! `layers[l + 1].len() == layers[l].len().div_ceil(2)` and the last layer
//! holds only the root.

use crate::allocation::AllocationList;
use crate::bytes::{Bytes32, HexString, ToBytes32, bytes32_to_hex};
use crate::encoding::{EncodingScheme, LeafEncoder};
use crate::error::{AllowlistError, Result, invariant};
use crate::hashes::hash_pair;
use serde::{Deserialize, Serialize};

pub const TREE_FORMAT: &str = "allowlist-v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowlistTree {
    layers: Vec<Vec<Bytes32>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowlistTreeData {
    pub format: String,
    pub encoding: EncodingScheme,
    pub root: HexString,
    pub layers: Vec<Vec<HexString>>,
}

fn next_layer(layer: &[Bytes32]) -> Vec<Bytes32> {
    layer
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_pair(left, right),
            [carried] => *carried,
            _ => unreachable!("chunks(2) yields one or two nodes"),
        })
        .collect()
}

#[inline]
fn sibling_index(layer_len: usize, index: usize) -> Option<usize> {
    if index % 2 == 1 {
        Some(index - 1)
    } else if index + 1 < layer_len {
        Some(index + 1)
    } else {
        None
    }
}

impl AllowlistTree {
    pub fn build(leaves: Vec<Bytes32>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(AllowlistError::EmptyAllocations);
        }

        let mut layers = vec![leaves];
        while let Some(top) = layers.last().filter(|layer| layer.len() > 1) {
            let parent = next_layer(top);
            layers.push(parent);
        }

        Ok(Self { layers })
    }

    /// Leaves are encoded in list order; the root covers every entry.
    pub fn from_allocations<E: LeafEncoder + ?Sized>(
        allocations: &AllocationList,
        encoder: &E,
    ) -> Result<Self> {
        let leaves = allocations
            .iter()
            .map(|entry| encoder.leaf_hash(entry))
            .collect::<Result<Vec<_>>>()?;
        Self::build(leaves)
    }

    pub fn root(&self) -> Bytes32 {
        self.layers[self.layers.len() - 1][0]
    }

    pub fn root_hex(&self) -> HexString {
        bytes32_to_hex(&self.root())
    }

    pub fn leaves(&self) -> &[Bytes32] {
        &self.layers[0]
    }

    pub fn layers(&self) -> &[Vec<Bytes32>] {
        &self.layers
    }

    /// Number of layers, leaves and root included.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn len(&self) -> usize {
        self.leaves().len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves().is_empty()
    }

    pub fn leaf_index(&self, leaf: &Bytes32) -> Option<usize> {
        self.leaves().iter().position(|candidate| candidate == leaf)
    }

    /// Sibling path from leaf `index` up to, not including, the root.
    /// Levels where the node is carried forward contribute nothing.
    pub fn proof(&self, index: usize) -> Result<Vec<Bytes32>> {
        if index >= self.len() {
            return Err(AllowlistError::IndexOutOfBounds {
                index,
                leaves: self.len(),
            });
        }

        let mut proof = Vec::with_capacity(self.depth().saturating_sub(1));
        let mut idx = index;
        for layer in &self.layers[..self.layers.len() - 1] {
            if let Some(sibling) = sibling_index(layer.len(), idx) {
                proof.push(layer[sibling]);
            }
            idx /= 2;
        }

        Ok(proof)
    }

    pub fn proof_for_leaf(&self, leaf: &Bytes32) -> Option<Vec<Bytes32>> {
        let index = self.leaf_index(leaf)?;
        self.proof(index).ok()
    }

    pub fn proof_hex(&self, index: usize) -> Result<Vec<HexString>> {
        Ok(self.proof(index)?.iter().map(bytes32_to_hex).collect())
    }

    /// Folds a proof onto a leaf the way `MerkleProof.processProof` does.
    #[must_use]
    pub fn process_proof(leaf: &Bytes32, proof: &[Bytes32]) -> Bytes32 {
        proof
            .iter()
            .fold(*leaf, |current, sibling| hash_pair(&current, sibling))
    }

    #[must_use]
    pub fn verify(root: &Bytes32, leaf: &Bytes32, proof: &[Bytes32]) -> bool {
        Self::process_proof(leaf, proof) == *root
    }

    /// Same as [`verify`](Self::verify) over the hex forms handed to clients.
    pub fn verify_hex<R: ToBytes32, L: ToBytes32>(
        root: &R,
        leaf: &L,
        proof: &[HexString],
    ) -> Result<bool> {
        let proof = proof
            .iter()
            .map(|node| node.to_bytes32())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::verify(&root.to_bytes32()?, &leaf.to_bytes32()?, &proof))
    }

    pub fn validate(&self) -> Result<()> {
        invariant(!self.layers.is_empty(), "tree has no layers")?;
        invariant(!self.layers[0].is_empty(), "tree has no leaves")?;

        for (level, pair) in self.layers.windows(2).enumerate() {
            let (below, above) = (&pair[0], &pair[1]);
            if above.len() != below.len().div_ceil(2) {
                return Err(AllowlistError::InvalidTree(format!(
                    "layer {} has {} nodes, expected {}",
                    level + 1,
                    above.len(),
                    below.len().div_ceil(2)
                )));
            }
            if next_layer(below) != *above {
                return Err(AllowlistError::InvalidTree(format!(
                    "layer {} does not hash to layer {}",
                    level,
                    level + 1
                )));
            }
        }

        let top = &self.layers[self.layers.len() - 1];
        if top.len() != 1 {
            return Err(AllowlistError::InvalidTree(format!(
                "top layer has {} nodes",
                top.len()
            )));
        }

        Ok(())
    }

    pub fn dump(&self, encoding: EncodingScheme) -> AllowlistTreeData {
        AllowlistTreeData {
            format: TREE_FORMAT.to_string(),
            encoding,
            root: self.root_hex(),
            layers: self
                .layers
                .iter()
                .map(|layer| layer.iter().map(bytes32_to_hex).collect())
                .collect(),
        }
    }

    pub fn load(data: &AllowlistTreeData) -> Result<Self> {
        if data.format != TREE_FORMAT {
            return Err(AllowlistError::UnknownFormat(data.format.clone()));
        }

        let layers = data
            .layers
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .map(|node| node.to_bytes32())
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        if layers.first().is_none_or(|leaves| leaves.is_empty()) {
            return Err(AllowlistError::EmptyAllocations);
        }

        let tree = Self { layers };
        tree.validate()?;

        if tree.root() != data.root.to_bytes32()? {
            return Err(AllowlistError::InvalidTree(
                "stored root does not match layers".to_string(),
            ));
        }

        Ok(tree)
    }

    pub fn render(&self) -> String {
        let top = self.layers.len() - 1;
        let mut stack: Vec<(usize, usize, Vec<bool>)> = vec![(top, 0, vec![])];
        let mut lines = Vec::new();

        while let Some((level, index, path)) = stack.pop() {
            let mut line = String::new();

            for &more in path.iter().take(path.len().saturating_sub(1)) {
                line.push_str(if more { "│  " } else { "   " });
            }

            if let Some(&more) = path.last() {
                line.push_str(if more { "├─ " } else { "└─ " });
            }

            line.push_str(&format!(
                "{level}:{index}) {}",
                bytes32_to_hex(&self.layers[level][index])
            ));
            lines.push(line);

            if level > 0 {
                let below = &self.layers[level - 1];
                let left = 2 * index;
                let right = left + 1;
                if right < below.len() {
                    stack.push((level - 1, right, [path.clone(), vec![false]].concat()));
                    stack.push((level - 1, left, [path, vec![true]].concat()));
                } else {
                    stack.push((level - 1, left, [path, vec![false]].concat()));
                }
            }
        }

        lines.join("\n")
    }
}
