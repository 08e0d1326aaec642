// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monitor loop: the single thread of control for the watch → snapshot →
//! broadcast pipeline.
//!
//! All event sources drain into one `select!` loop: raw filesystem wakes,
//! the debounce deadline, on-demand snapshot requests from the hub, and the
//! idle check. The loop exclusively owns the WatchSet and the Snapshotter's
//! change-detection state, so no locking is needed around either.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::descriptor::Status;
use crate::hub::Hub;
use crate::idle::IdleGate;
use crate::scan::scan_roles;
use crate::snapshot::Snapshotter;
use crate::watch::WatchSet;

/// Why the monitor loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorExit {
    /// No viewer ping within the idle timeout.
    Idle,
    /// External shutdown (signal or server error).
    Shutdown,
}

/// Parameters for building a new [`Monitor`].
pub struct MonitorConfig {
    pub job_dir: PathBuf,
    pub snapshotter: Snapshotter,
    pub watches: WatchSet,
    pub hub: Arc<Hub>,
    pub idle: Arc<IdleGate>,
    pub wake_rx: mpsc::Receiver<()>,
    pub refresh_rx: mpsc::Receiver<()>,
    pub debounce: Duration,
    pub idle_poll: Duration,
    pub idle_timeout: Duration,
    pub shutdown: CancellationToken,
}

/// Core monitor that runs the select-loop pipeline.
pub struct Monitor {
    job_dir: PathBuf,
    snapshotter: Snapshotter,
    watches: WatchSet,
    hub: Arc<Hub>,
    idle: Arc<IdleGate>,
    wake_rx: mpsc::Receiver<()>,
    refresh_rx: mpsc::Receiver<()>,
    debounce: Duration,
    idle_poll: Duration,
    idle_timeout: Duration,
    shutdown: CancellationToken,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        let MonitorConfig {
            job_dir,
            snapshotter,
            watches,
            hub,
            idle,
            wake_rx,
            refresh_rx,
            debounce,
            idle_poll,
            idle_timeout,
            shutdown,
        } = config;
        Self {
            job_dir,
            snapshotter,
            watches,
            hub,
            idle,
            wake_rx,
            refresh_rx,
            debounce,
            idle_poll,
            idle_timeout,
            shutdown,
        }
    }

    /// Run until the idle timeout fires or shutdown is triggered.
    pub async fn run(mut self) -> MonitorExit {
        self.attach_watches();
        self.refresh();

        let mut idle_interval = tokio::time::interval(self.idle_poll);
        idle_interval.reset();
        let mut deadline: Option<Instant> = None;

        loop {
            let debounce_fire = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                _ = self.shutdown.cancelled() => return MonitorExit::Shutdown,

                // Raw change notification: attach watches for any newly
                // discovered role files, then arm the debounce window. A
                // pending deadline is left alone so bursts collapse.
                wake = self.wake_rx.recv() => {
                    match wake {
                        Some(()) => {
                            self.attach_watches();
                            if deadline.is_none() {
                                deadline = Some(Instant::now() + self.debounce);
                            }
                        }
                        None => return MonitorExit::Shutdown,
                    }
                }

                _ = debounce_fire => {
                    deadline = None;
                    self.refresh();
                }

                // Immediate snapshot request from a subscriber that joined
                // before any snapshot existed.
                req = self.refresh_rx.recv() => {
                    if req.is_some() {
                        self.refresh();
                    }
                }

                _ = idle_interval.tick() => {
                    if self.idle.expired(self.idle_timeout) {
                        info!(
                            timeout_secs = self.idle_timeout.as_secs_f32(),
                            "no viewer heartbeat, shutting down"
                        );
                        return MonitorExit::Idle;
                    }
                }
            }
        }
    }

    /// Ensure the job directory and every known role file are watched.
    /// Safe to call repeatedly; the WatchSet is idempotent and monotonic.
    fn attach_watches(&mut self) {
        self.watches.ensure(&self.job_dir);
        for entry in scan_roles(&self.job_dir) {
            self.watches.ensure(&entry.descriptor_path);
            self.watches.ensure(&entry.log_path);
        }
    }

    /// Re-snapshot and broadcast if state changed.
    fn refresh(&mut self) {
        if let Some((snap, payload)) = self.snapshotter.refresh() {
            let active =
                snap.roles.iter().filter(|r| Status::parse(&r.status) == Status::InProgress).count();
            debug!(
                roles = snap.roles.len(),
                active,
                done = snap.done.is_some(),
                subscribers = self.hub.subscriber_count(),
                "broadcasting state change"
            );
            self.hub.publish(payload);
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
