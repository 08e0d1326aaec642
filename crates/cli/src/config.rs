// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::tail::{FETCH_BUDGET, SNAPSHOT_BUDGET};

/// Live viewer for agent job directories.
#[derive(Debug, Parser)]
#[command(name = "jobview", version, about)]
pub struct Config {
    /// Job directory to observe.
    #[arg(value_name = "JOB_DIR")]
    pub job_dir: PathBuf,

    /// HTTP port to listen on.
    #[arg(long, env = "JOBVIEW_PORT", default_value = "9999")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "JOBVIEW_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Open the system browser once the server is listening.
    #[arg(long)]
    pub open: bool,

    /// Log format (json or text).
    #[arg(long, env = "JOBVIEW_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "JOBVIEW_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    // -- Tuning knobs (skip from CLI; set in Config::test()) --------
    /// Quiet window for coalescing filesystem notification bursts.
    #[clap(skip)]
    pub debounce_ms: Option<u64>,
    #[clap(skip)]
    pub idle_timeout_ms: Option<u64>,
    #[clap(skip)]
    pub idle_poll_ms: Option<u64>,
    #[clap(skip)]
    pub snapshot_tail_bytes: Option<u64>,
    #[clap(skip)]
    pub fetch_tail_bytes: Option<u64>,
}

fn env_duration_ms(var: &str, default: u64) -> Duration {
    let ms = std::env::var(var).ok().and_then(|v| v.parse().ok()).unwrap_or(default);
    Duration::from_millis(ms)
}

fn env_bytes(var: &str, default: u64) -> u64 {
    std::env::var(var).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

macro_rules! duration_field {
    ($method:ident, $field:ident, $env:literal, $default:expr) => {
        pub fn $method(&self) -> Duration {
            match self.$field {
                Some(ms) => Duration::from_millis(ms),
                None => env_duration_ms($env, $default),
            }
        }
    };
}

macro_rules! bytes_field {
    ($method:ident, $field:ident, $env:literal, $default:expr) => {
        pub fn $method(&self) -> u64 {
            match self.$field {
                Some(bytes) => bytes,
                None => env_bytes($env, $default),
            }
        }
    };
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.job_dir.is_dir() {
            anyhow::bail!("job directory not found: {}", self.job_dir.display());
        }
        Ok(())
    }

    // -- Tuning knobs (field override → env var → compiled default) --------

    duration_field!(debounce, debounce_ms, "JOBVIEW_DEBOUNCE_MS", 100);
    duration_field!(idle_timeout, idle_timeout_ms, "JOBVIEW_IDLE_TIMEOUT_MS", 10_000);
    duration_field!(idle_poll, idle_poll_ms, "JOBVIEW_IDLE_POLL_MS", 3_000);
    bytes_field!(snapshot_tail, snapshot_tail_bytes, "JOBVIEW_SNAPSHOT_TAIL_BYTES", SNAPSHOT_BUDGET);
    bytes_field!(fetch_tail, fetch_tail_bytes, "JOBVIEW_FETCH_TAIL_BYTES", FETCH_BUDGET);

    /// Basename of the job directory, shown in the viewer page.
    pub fn job_name(&self) -> String {
        self.job_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.job_dir.display().to_string())
    }

    /// Build a minimal `Config` for tests (port 0, tight timers).
    #[doc(hidden)]
    pub fn test(job_dir: PathBuf) -> Self {
        Self {
            job_dir,
            port: 0,
            host: "127.0.0.1".into(),
            open: false,
            log_format: "text".into(),
            log_level: "debug".into(),
            debounce_ms: Some(10),
            idle_timeout_ms: Some(10_000),
            idle_poll_ms: Some(50),
            snapshot_tail_bytes: Some(4096),
            fetch_tail_bytes: Some(16_384),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
