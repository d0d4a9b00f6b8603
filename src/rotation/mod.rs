//! Live entropy key rotation
//!
//! Key-file change notifications are decrypted through a [`KeyVault`] and
//! applied to the ledger by a cancellable background task.
//!
//! [`KeyVault`]: crate::crypto::KeyVault

pub mod fs_events;
pub mod watcher;

pub use fs_events::watch_key_file;
pub use watcher::{KeyRotationWatcher, RotationPolicy, WatcherHandle};
