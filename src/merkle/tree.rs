//! Merkle Tree
//!
//! Level-by-level binary hash tree over an ordered sequence of leaf digests.
//! Level 0 holds the leaves; each level above is half the length of the one
//! below, with an odd tail paired with itself. The root is the single digest
//! on the top level.

use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::merkle::hash::{hash_pair, Hash};

/// Sibling digests from leaf to root, one per level below the root.
pub type Proof = Vec<Hash>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build a tree from `leaves`. Fails on empty input rather than
    /// inventing a root.
    pub fn build(leaves: Vec<Hash>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(LedgerError::EmptyInputError);
        }

        let mut levels = vec![leaves];
        while let Some(current) = levels.last().filter(|level| level.len() > 1) {
            let next: Vec<Hash> = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    [single] => hash_pair(single, single),
                    _ => unreachable!("chunks(2) yields one or two items"),
                })
                .collect();
            levels.push(next);
        }

        let tree = Self { levels };
        debug!(
            "Built Merkle tree: {} leaves, {} levels, root {}",
            tree.leaf_count(),
            tree.levels.len(),
            tree.root()
        );
        Ok(tree)
    }

    /// Rebuild with `leaf` appended. `self` is untouched, so a caller holding
    /// the old tree keeps a consistent (leaves, root) pair.
    pub fn append(&self, leaf: Hash) -> Result<Self> {
        let mut leaves = self.leaves().to_vec();
        leaves.push(leaf);
        Self::build(leaves)
    }

    pub fn root(&self) -> Hash {
        self.levels[self.levels.len() - 1][0]
    }

    pub fn leaves(&self) -> &[Hash] {
        &self.levels[0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Inclusion proof for the leaf at `leaf_index`.
    ///
    /// A node without a sibling was hashed with itself, so its own digest is
    /// emitted as the sibling for that level.
    pub fn proof(&self, leaf_index: usize) -> Result<Proof> {
        let len = self.leaf_count();
        if leaf_index >= len {
            return Err(LedgerError::IndexOutOfRangeError {
                index: leaf_index,
                len,
            });
        }

        let mut proof = Vec::with_capacity(self.depth());
        let mut index = leaf_index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = level.get(index ^ 1).unwrap_or(&level[index]);
            proof.push(*sibling);
            index /= 2;
        }
        Ok(proof)
    }

    /// Check that `leaf` folds up to `root` through `proof`.
    pub fn verify(leaf: &Hash, proof: &[Hash], root: &Hash) -> bool {
        let computed = proof
            .iter()
            .fold(*leaf, |current, sibling| hash_pair(&current, sibling));
        computed == *root
    }
}
