// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::sync::Arc;

use crate::hub::Hub;
use crate::idle::IdleGate;

/// Shared application state passed to all handlers via axum `State` extractor.
pub struct AppState {
    /// Job directory being observed (read-only).
    pub job_dir: PathBuf,
    /// Directory basename, interpolated into the viewer page.
    pub job_name: String,
    /// Byte budget for on-demand `/log` fetches.
    pub fetch_budget: u64,
    pub hub: Arc<Hub>,
    pub idle: Arc<IdleGate>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("job_dir", &self.job_dir)
            .field("subscribers", &self.hub.subscriber_count())
            .finish()
    }
}
