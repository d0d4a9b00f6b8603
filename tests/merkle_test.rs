//! Merkle Tree Property Tests
//!
//! Inclusion, tamper detection and determinism over a range of tree sizes.

use entropy_ledger::merkle::{hash_leaf, Hash, MerkleTree};
use entropy_ledger::LedgerError;

fn transaction_leaves(count: usize) -> Vec<Hash> {
    (0..count)
        .map(|i| hash_leaf(&format!("sender{}->recipient{}:{}", i, i + 1, i * 10)))
        .collect()
}

#[test]
fn test_all_indices_verify_for_many_sizes() {
    for count in [1, 2, 3, 4, 5, 7, 8, 9, 16, 31, 33, 100] {
        let leaves = transaction_leaves(count);
        let tree = MerkleTree::build(leaves.clone()).unwrap();
        for (i, leaf) in leaves.iter().enumerate() {
            let proof = tree.proof(i).unwrap();
            assert!(MerkleTree::verify(leaf, &proof, &tree.root()), "size {} index {}", count, i);
        }
    }
}

#[test]
fn test_every_single_bit_flip_in_root_fails() {
    let leaves = transaction_leaves(5);
    let tree = MerkleTree::build(leaves.clone()).unwrap();
    let proof = tree.proof(2).unwrap();

    for byte in 0..32 {
        for bit in 0..8 {
            let mut root = *tree.root().as_bytes();
            root[byte] ^= 1 << bit;
            assert!(!MerkleTree::verify(&leaves[2], &proof, &Hash::from_bytes(root)));
        }
    }
}

#[test]
fn test_truncated_or_extended_proof_fails() {
    let leaves = transaction_leaves(8);
    let tree = MerkleTree::build(leaves.clone()).unwrap();
    let proof = tree.proof(5).unwrap();

    assert!(!MerkleTree::verify(&leaves[5], &proof[..proof.len() - 1], &tree.root()));

    let mut extended = proof.clone();
    extended.push(leaves[0]);
    assert!(!MerkleTree::verify(&leaves[5], &extended, &tree.root()));
}

#[test]
fn test_rebuild_is_byte_identical() {
    let leaves = transaction_leaves(13);
    let first = MerkleTree::build(leaves.clone()).unwrap();
    let second = MerkleTree::build(leaves).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_order_matters_for_root() {
    let mut leaves = transaction_leaves(4);
    let root = MerkleTree::build(leaves.clone()).unwrap().root();
    leaves.swap(0, 2);
    assert_ne!(MerkleTree::build(leaves).unwrap().root(), root);
}

#[test]
fn test_contract_errors() {
    assert_eq!(MerkleTree::build(Vec::new()), Err(LedgerError::EmptyInputError));

    let tree = MerkleTree::build(transaction_leaves(3)).unwrap();
    assert!(matches!(
        tree.proof(3),
        Err(LedgerError::IndexOutOfRangeError { index: 3, len: 3 })
    ));
}
