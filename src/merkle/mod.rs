//! Merkle anchoring primitives
//!
//! Sorted-pair SHA-256 hashing and the level-by-level tree used to anchor
//! ledger transactions and entropy keys.

pub mod hash;
pub mod tree;

pub use hash::{hash_leaf, hash_pair, Hash, HASH_LEN};
pub use tree::{MerkleTree, Proof};
