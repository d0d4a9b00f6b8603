//! Ledger
//!
//! Append-only transaction store and live entropy key set, each anchored
//! under its own Merkle tree. All state sits behind one `RwLock`; every
//! mutation builds the replacement state first and swaps it in only on
//! success, so readers see either the old or the new state, never a mix.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::entropy::{EntropyKeySet, KeyInclusion, LatestBlock, PublishedEntropyKey};
use super::record::{TransactionRecord, TransactionRequest};
use crate::crypto::{SignatureManager, SigningIdentity};
use crate::error::{LedgerError, Result};
use crate::merkle::{hash_leaf, Hash, MerkleTree};
use crate::rotation::RotationPolicy;

#[derive(Debug, Default)]
struct LedgerState {
    transactions: Vec<TransactionRecord>,
    tx_tree: Option<MerkleTree>,
    keys: EntropyKeySet,
    signer: Option<Arc<SigningIdentity>>,
    latest_entropy: Option<PublishedEntropyKey>,
}

/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct Ledger {
    state: Arc<RwLock<LedgerState>>,
    signatures: Arc<SignatureManager>,
    max_transactions: Option<usize>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState::default())),
            signatures: Arc::new(SignatureManager::new()),
            max_transactions: None,
        }
    }

    pub fn with_capacity_limit(mut self, max_transactions: usize) -> Self {
        self.max_transactions = Some(max_transactions);
        self
    }

    pub fn signatures(&self) -> &SignatureManager {
        &self.signatures
    }

    /// Validate, hash, sign and anchor a transaction.
    ///
    /// `signing_key` overrides the active signer for this one submission.
    /// On any error no leaf is appended.
    pub async fn submit(
        &self,
        sender: Option<&str>,
        recipient: Option<&str>,
        amount: Option<&str>,
        signing_key: Option<&SigningIdentity>,
    ) -> Result<TransactionRecord> {
        let request = TransactionRequest::new(sender, recipient, amount)?;
        let payload = request.canonical_string();
        let hash = request.leaf_hash();

        let active = match signing_key {
            Some(_) => None,
            None => self.state.read().await.signer.clone(),
        };
        let signer = signing_key.or(active.as_deref());

        // Signing is CPU-bound and independent of ledger state, so it runs
        // before the write lock is taken.
        let signed = match signer {
            Some(identity) => {
                let signature = self.signatures.sign(&payload, identity.private_key())?;
                let verified = self
                    .signatures
                    .verify(&payload, &signature, identity.public_key_pem())?;
                Some((signature, identity.public_key_pem().to_string(), verified))
            }
            None => None,
        };

        let mut state = self.state.write().await;

        if let Some(limit) = self.max_transactions {
            if state.transactions.len() >= limit {
                warn!("Rejecting transaction {}: ledger is full", hash);
                return Err(LedgerError::CapacityError(limit));
            }
        }

        let tree = match &state.tx_tree {
            Some(tree) => tree.append(hash)?,
            None => MerkleTree::build(vec![hash])?,
        };
        let index = tree.leaf_count() - 1;
        let proof = tree.proof(index)?;

        let (signature, signer_public_key, verified) = match signed {
            Some((sig, pem, ok)) => (Some(sig), Some(pem), Some(ok)),
            None => (None, None, None),
        };

        let record = TransactionRecord {
            index,
            sender: request.sender,
            recipient: request.recipient,
            amount: request.amount,
            hash,
            signature,
            signer_public_key,
            proof,
            root_at_insertion: tree.root(),
            verified,
            timestamp: Utc::now(),
        };

        state.tx_tree = Some(tree);
        state.transactions.push(record.clone());

        info!("Anchored transaction {}", record.summary());
        Ok(record)
    }

    /// Check a caller-supplied proof against a caller-supplied root, which
    /// may be older than the current one.
    pub fn verify_transaction(&self, hash: &Hash, proof: &[Hash], root: &Hash) -> bool {
        MerkleTree::verify(hash, proof, root)
    }

    pub async fn list_transactions(&self) -> Vec<TransactionRecord> {
        self.state.read().await.transactions.clone()
    }

    pub async fn get_transaction(&self, hash: &Hash) -> Result<TransactionRecord> {
        self.state
            .read()
            .await
            .transactions
            .iter()
            .find(|record| record.hash == *hash)
            .cloned()
            .ok_or_else(|| LedgerError::NotFoundError(format!("transaction {}", hash)))
    }

    pub async fn transaction_root(&self) -> Option<Hash> {
        self.state.read().await.tx_tree.as_ref().map(MerkleTree::root)
    }

    /// Replace the live key set and its tree in one step.
    pub async fn rotate_keys(&self, keys: Vec<String>) -> Result<Option<Hash>> {
        let next = EntropyKeySet::build(keys)?;
        let root = next.root();

        let mut state = self.state.write().await;
        state.keys = next;

        match root {
            Some(root) => info!(
                "Rotated entropy keys: {} live, root {}",
                state.keys.keys().len(),
                root
            ),
            None => warn!("Rotated entropy keys to an empty set"),
        }
        Ok(root)
    }

    /// Apply one rotated key under `policy` and, when given, install `signer`
    /// under the same write guard. A submission never sees the new key set
    /// paired with the old signer.
    pub async fn apply_rotation(
        &self,
        key: String,
        policy: RotationPolicy,
        signer: Option<SigningIdentity>,
    ) -> Result<Option<Hash>> {
        let mut state = self.state.write().await;

        let next = match policy {
            RotationPolicy::Replace => Some(EntropyKeySet::build(vec![key])?),
            RotationPolicy::Append if state.keys.position(&key).is_some() => {
                debug!("Entropy key already live; set unchanged");
                None
            }
            RotationPolicy::Append => {
                let mut keys = state.keys.keys().to_vec();
                keys.push(key);
                Some(EntropyKeySet::build(keys)?)
            }
        };

        if let Some(next) = next {
            state.keys = next;
            info!(
                "Rotated entropy keys ({:?}): {} live",
                policy,
                state.keys.keys().len()
            );
        }
        if let Some(identity) = signer {
            state.signer = Some(Arc::new(identity));
            info!("Installed new transaction signing key");
        }

        Ok(state.keys.root())
    }

    pub async fn entropy_keys(&self) -> Vec<String> {
        self.state.read().await.keys.keys().to_vec()
    }

    pub async fn key_root(&self) -> Option<Hash> {
        self.state.read().await.keys.root()
    }

    /// Consistent (keys, root) pair from a single read.
    pub async fn key_snapshot(&self) -> (Vec<String>, Option<Hash>) {
        let state = self.state.read().await;
        (state.keys.keys().to_vec(), state.keys.root())
    }

    /// Prove that `key` is in the current live set.
    pub async fn verify_key(&self, key: &str) -> Result<KeyInclusion> {
        let state = self.state.read().await;
        let index = state
            .keys
            .position(key)
            .ok_or_else(|| LedgerError::NotFoundError("Key not found".to_string()))?;

        let proof = state.keys.proof(index)?;
        let root = state.keys.root().ok_or(LedgerError::EmptyInputError)?;

        Ok(KeyInclusion {
            valid: MerkleTree::verify(&hash_leaf(key), &proof, &root),
            proof_path: proof,
            merkle_root: root,
        })
    }

    pub async fn latest_block(&self) -> LatestBlock {
        let state = self.state.read().await;
        let signer = state.signer.as_ref().map(|s| s.public_key_pem());
        LatestBlock::new(&state.keys, signer, Utc::now())
    }

    pub async fn signer_public_key(&self) -> Option<String> {
        self.state
            .read()
            .await
            .signer
            .as_ref()
            .map(|s| s.public_key_pem().to_string())
    }

    pub async fn publish_entropy_key(
        &self,
        entropy_key: Option<&str>,
        public_key_pem: Option<&str>,
    ) -> Result<PublishedEntropyKey> {
        let entropy_key = entropy_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LedgerError::missing_field("entropyKey"))?;
        let public_key_pem = public_key_pem
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LedgerError::missing_field("publicKeyPem"))?;

        SignatureManager::parse_public_key(public_key_pem)?;

        let published = PublishedEntropyKey {
            entropy_key: entropy_key.to_string(),
            public_key_pem: public_key_pem.to_string(),
            timestamp: Utc::now(),
        };

        self.state.write().await.latest_entropy = Some(published.clone());
        info!("Published entropy key at {}", published.timestamp);
        Ok(published)
    }

    pub async fn latest_entropy_key(&self) -> Result<PublishedEntropyKey> {
        self.state
            .read()
            .await
            .latest_entropy
            .clone()
            .ok_or_else(|| LedgerError::NotFoundError("No entropy key published".to_string()))
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
