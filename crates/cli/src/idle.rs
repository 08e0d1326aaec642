// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Viewer liveness tracking for idle self-termination.
//!
//! Pings arrive on a lightweight signal separate from the event stream, so a
//! page that holds the stream open but is closed or unreachable still ages
//! out. Uses the tokio clock, which tests can pause and advance.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Records the most recent liveness ping from any viewer.
#[derive(Debug)]
pub struct IdleGate {
    last_ping: Mutex<Instant>,
}

impl IdleGate {
    /// Start the gate with an implicit ping, giving the first viewer one full
    /// timeout window to show up.
    pub fn new() -> Self {
        Self { last_ping: Mutex::new(Instant::now()) }
    }

    /// Record a liveness ping.
    pub fn ping(&self) {
        *self.last_ping.lock() = Instant::now();
    }

    /// Time since the most recent ping.
    pub fn since_last(&self) -> Duration {
        self.last_ping.lock().elapsed()
    }

    /// Whether no ping has been seen within `timeout`.
    pub fn expired(&self, timeout: Duration) -> bool {
        self.since_last() >= timeout
    }
}

impl Default for IdleGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "idle_tests.rs"]
mod tests;
