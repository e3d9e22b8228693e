//! Filesystem change feed for a vault.
//!
//! Every create or modify event on a markdown note is forwarded as a
//! [`DocumentRef`]. Events are neither debounced nor coalesced; refreshes
//! are idempotent, so redundant notifications only cost a re-read.

use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::event::{EventKind, ModifyKind};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::store::{DocumentRef, FsVault};

/// One item delivered by the feed.
#[derive(Debug)]
pub enum Change {
    Document(DocumentRef),
    Error(notify::Error),
}

/// Live change notifications for the notes of one vault.
pub struct ChangeFeed {
    // Dropping the watcher stops delivery.
    _watcher: RecommendedWatcher,
    rx: Receiver<Change>,
}

impl ChangeFeed {
    /// Start watching the vault root.
    pub fn start(vault: &FsVault, recursive: bool) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mapper = vault.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    if !is_content_change(&event.kind) {
                        trace!(kind = ?event.kind, "skipping event");
                        return;
                    }
                    for path in &event.paths {
                        if let Some(document) = note_for(&mapper, path) {
                            let _ = tx.send(Change::Document(document));
                        }
                    }
                }
                Err(err) => {
                    let _ = tx.send(Change::Error(err));
                }
            }
        })?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(vault.root(), mode)?;
        debug!(root = %vault.root().display(), recursive, "watching vault");

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Block until the next change, or `None` once the watcher is gone.
    pub fn recv(&self) -> Option<Change> {
        self.rx.recv().ok()
    }

    /// Wait up to `timeout` for the next change.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Change> {
        match self.rx.recv_timeout(timeout) {
            Ok(change) => Some(change),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}

fn note_for(vault: &FsVault, path: &Path) -> Option<DocumentRef> {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    match vault.document_for(&path) {
        Ok(document) if document.is_note() => Some(document),
        Ok(_) => None,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "dropping change outside vault");
            None
        }
    }
}
