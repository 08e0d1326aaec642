// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem watch subscriptions.
//!
//! [`WatchSet`] wraps a `notify` watcher and forwards every raw change
//! notification as a wake on an mpsc channel; the control loop owns the
//! debounce window. The set is monotonic: paths are added as roles appear
//! and never removed within a process lifetime.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::debug;

/// The set of filesystem paths currently observed.
pub struct WatchSet {
    watcher: Option<RecommendedWatcher>,
    watched: HashSet<PathBuf>,
}

impl WatchSet {
    /// Build a watch set whose notifications wake `wake_tx`.
    ///
    /// The channel send is `try_send`: a full channel means a wake is already
    /// pending, which is all the control loop needs to know.
    pub fn new(wake_tx: mpsc::Sender<()>) -> Self {
        let watcher = notify::recommended_watcher(move |_: notify::Result<notify::Event>| {
            let _ = wake_tx.try_send(());
        })
        .ok();
        if watcher.is_none() {
            debug!("filesystem watcher unavailable, relying on on-demand snapshots");
        }
        Self { watcher, watched: HashSet::new() }
    }

    /// Start watching `path` if it isn't watched already. Idempotent and
    /// fail-soft: a path that doesn't exist yet simply isn't added, and the
    /// next directory-level notification retries it.
    ///
    /// Returns whether a new watch was attached.
    pub fn ensure(&mut self, path: &Path) -> bool {
        if self.watched.contains(path) {
            return false;
        }
        let Some(watcher) = self.watcher.as_mut() else {
            return false;
        };
        match watcher.watch(path, RecursiveMode::NonRecursive) {
            Ok(()) => {
                debug!(path = %path.display(), "watching");
                self.watched.insert(path.to_owned());
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.watched.contains(path)
    }

    pub fn len(&self) -> usize {
        self.watched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
