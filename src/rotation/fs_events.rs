//! Filesystem change source for the rotation watcher.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{LedgerError, Result};

/// Forward create/modify events for `key_path` into `changes`.
///
/// The returned watcher must be kept alive for events to flow. Events that
/// arrive while the channel is full are dropped, which collapses bursts of
/// writes into the pending notification.
pub fn watch_key_file(key_path: &Path, changes: mpsc::Sender<PathBuf>) -> Result<RecommendedWatcher> {
    let file_name = key_path
        .file_name()
        .map(|name| name.to_os_string())
        .ok_or_else(|| {
            LedgerError::ConfigError(format!("Key path {:?} has no file name", key_path))
        })?;
    let dir = match key_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                return;
            }
            for path in event.paths {
                if path.file_name() != Some(file_name.as_os_str()) {
                    continue;
                }
                if let Err(e) = changes.try_send(path) {
                    debug!("[Watcher] Dropping key file event: {}", e);
                }
            }
        }
        Err(e) => warn!("[Watcher] File watch error: {}", e),
    })
    .map_err(|e| LedgerError::WatchError(format!("Failed to create watcher: {}", e)))?;

    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| LedgerError::WatchError(format!("Failed to watch {:?}: {}", dir, e)))?;

    info!("[Watcher] Monitoring directory: {:?}", dir);
    Ok(watcher)
}
