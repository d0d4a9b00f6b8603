//! Entropy key views
//!
//! The live key set and its Merkle anchor, plus the single-slot store for the
//! most recently published entropy key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::merkle::{hash_leaf, Hash, MerkleTree, Proof};

/// Live entropy keys and the tree built over their leaf hashes.
///
/// Always replaced as a whole, so keys, tree and root never disagree.
#[derive(Debug, Clone, Default)]
pub struct EntropyKeySet {
    keys: Vec<String>,
    tree: Option<MerkleTree>,
}

impl EntropyKeySet {
    pub fn build(keys: Vec<String>) -> crate::Result<Self> {
        let tree = if keys.is_empty() {
            None
        } else {
            Some(MerkleTree::build(keys.iter().map(|k| hash_leaf(k)).collect())?)
        };
        Ok(Self { keys, tree })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn root(&self) -> Option<Hash> {
        self.tree.as_ref().map(MerkleTree::root)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    pub fn proof(&self, index: usize) -> crate::Result<Proof> {
        match &self.tree {
            Some(tree) => tree.proof(index),
            None => Err(crate::LedgerError::IndexOutOfRangeError { index, len: 0 }),
        }
    }
}

/// Result of checking a key against the current key tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInclusion {
    pub valid: bool,
    pub proof_path: Proof,
    pub merkle_root: Hash,
}

/// Point-in-time view of the key anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestBlock {
    pub timestamp: DateTime<Utc>,
    pub entropy_keys: Vec<String>,
    pub merkle_root: Option<Hash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_public_key: Option<String>,
    pub hash: String,
}

impl LatestBlock {
    pub fn new(
        keys: &EntropyKeySet,
        signer_public_key: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let root_hex = keys.root().map(|r| r.to_hex()).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(root_hex.as_bytes());
        hasher.update(timestamp.to_rfc3339().as_bytes());

        Self {
            timestamp,
            entropy_keys: keys.keys().to_vec(),
            merkle_root: keys.root(),
            signer_public_key: signer_public_key.map(str::to_string),
            hash: hex::encode(hasher.finalize()),
        }
    }
}

/// Last-write-wins published entropy key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedEntropyKey {
    pub entropy_key: String,
    pub public_key_pem: String,
    pub timestamp: DateTime<Utc>,
}
