pub mod api;
pub mod config;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod merkle;
pub mod rotation;

pub use error::{LedgerError, Result};
pub use ledger::Ledger;
pub use merkle::{Hash, MerkleTree};
