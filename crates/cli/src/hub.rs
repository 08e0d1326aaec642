// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broadcast hub: fan-out of serialized snapshots to stream subscribers.

use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc};

/// Capacity of the snapshot broadcast channel. A subscriber that lags this
/// far behind skips to the newest snapshot, which is always a complete state.
const CHANNEL_CAPACITY: usize = 64;

/// Holds the live subscriber set and the last published snapshot payload.
///
/// Subscribers are receivers on a broadcast channel; membership follows the
/// receiver's lifetime, so a disconnecting stream unsubscribes by dropping.
/// Send failures (no receivers, lagged receivers) never abort delivery to
/// the others.
#[derive(Debug)]
pub struct Hub {
    tx: broadcast::Sender<String>,
    last: RwLock<Option<String>>,
    refresh_tx: mpsc::Sender<()>,
}

impl Hub {
    /// Build a hub. `refresh_tx` lets the hub request an immediate snapshot
    /// cycle from the control loop when a subscriber joins before any
    /// snapshot exists.
    pub fn new(refresh_tx: mpsc::Sender<()>) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx, last: RwLock::new(None), refresh_tx }
    }

    /// Add a subscriber.
    ///
    /// Returns the last snapshot payload for immediate replay (so a late
    /// joiner never waits for the next change) plus the live receiver. When
    /// no snapshot has been produced yet, an immediate cycle is requested
    /// instead.
    pub fn subscribe(&self) -> (Option<String>, broadcast::Receiver<String>) {
        let rx = self.tx.subscribe();
        let replay = self.last.read().clone();
        if replay.is_none() {
            let _ = self.refresh_tx.try_send(());
        }
        (replay, rx)
    }

    /// Publish a new snapshot payload to every current subscriber and
    /// remember it for replay.
    pub fn publish(&self, payload: String) {
        *self.last.write() = Some(payload.clone());
        let _ = self.tx.send(payload);
    }

    /// Number of currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
