//! Merkle-anchored ledger
//!
//! Transactions flow Received -> Hashed -> Signed/Unsigned -> Anchored ->
//! Stored; nothing moves backward and nothing is deleted.

pub mod entropy;
pub mod record;
pub mod store;

pub use entropy::{EntropyKeySet, KeyInclusion, LatestBlock, PublishedEntropyKey};
pub use record::{TransactionRecord, TransactionRequest};
pub use store::Ledger;
