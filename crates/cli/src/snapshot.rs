// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot composition and change detection.
//!
//! A [`JobSnapshot`] is the aggregate broadcast unit: every role's descriptor
//! fields and log tail, the job-level descriptor text, and the completion
//! sentinel. The [`Snapshotter`] owns the serialization of the last broadcast
//! snapshot and suppresses re-broadcasts of unchanged state.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::descriptor::DescriptorParser;
use crate::scan::scan_roles;
use crate::tail::read_tail;

/// Filename of the optional job-level descriptor.
const JOB_MD: &str = "job.md";

/// Filename of the optional completion sentinel.
const DONE_FILE: &str = ".done";

/// One role's state as it appears on the wire.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoleState {
    pub id: String,
    pub status: String,
    pub locked: String,
    pub locked_by: String,
    pub goal: String,
    pub target: String,
    pub summary: String,
    pub log: String,
    #[serde(rename = "logSize")]
    pub log_size: u64,
}

/// Point-in-time aggregate state of the whole job directory.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JobSnapshot {
    pub roles: Vec<RoleState>,
    #[serde(rename = "jobMd")]
    pub job_md: String,
    pub done: Option<String>,
    pub ts: u64,
}

/// Serialization view used for change detection: everything except `ts`.
#[derive(Serialize)]
struct Fingerprint<'a> {
    roles: &'a [RoleState],
    #[serde(rename = "jobMd")]
    job_md: &'a str,
    done: &'a Option<String>,
}

fn epoch_millis() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

/// Compose one snapshot of `job_dir`. Every constituent read is fail-soft.
pub fn capture_snapshot(job_dir: &Path, parser: &DescriptorParser, tail_budget: u64) -> JobSnapshot {
    let roles = scan_roles(job_dir)
        .into_iter()
        .map(|entry| {
            let desc = parser.parse_file(&entry.descriptor_path);
            let tail = read_tail(&entry.log_path, tail_budget);
            RoleState {
                id: entry.id,
                status: desc.status,
                locked: desc.locked,
                locked_by: desc.locked_by,
                goal: desc.goal,
                target: desc.target,
                summary: desc.summary,
                log: tail.content,
                log_size: tail.size,
            }
        })
        .collect();

    let job_md = std::fs::read_to_string(job_dir.join(JOB_MD)).unwrap_or_default();
    let done = std::fs::read_to_string(job_dir.join(DONE_FILE)).ok().map(|s| s.trim().to_owned());

    JobSnapshot { roles, job_md, done, ts: epoch_millis() }
}

/// Owns the last broadcast serialization and produces new snapshots only on
/// change. The timestamp is excluded from the comparison, so filesystem churn
/// that leaves state identical never reaches subscribers.
#[derive(Debug)]
pub struct Snapshotter {
    job_dir: PathBuf,
    parser: DescriptorParser,
    tail_budget: u64,
    last: Option<String>,
}

impl Snapshotter {
    pub fn new(job_dir: PathBuf, tail_budget: u64) -> anyhow::Result<Self> {
        Ok(Self { job_dir, parser: DescriptorParser::new()?, tail_budget, last: None })
    }

    /// Compose a fresh snapshot without touching the change-detection state.
    pub fn capture(&self) -> JobSnapshot {
        capture_snapshot(&self.job_dir, &self.parser, self.tail_budget)
    }

    /// Re-snapshot the directory. Returns the snapshot and its serialized
    /// payload when state changed since the last call, `None` otherwise.
    pub fn refresh(&mut self) -> Option<(JobSnapshot, String)> {
        let snap = self.capture();
        let fp = serde_json::to_string(&Fingerprint {
            roles: &snap.roles,
            job_md: &snap.job_md,
            done: &snap.done,
        })
        .ok()?;
        if self.last.as_deref() == Some(fp.as_str()) {
            return None;
        }
        self.last = Some(fp);
        let payload = serde_json::to_string(&snap).ok()?;
        Some((snap, payload))
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
