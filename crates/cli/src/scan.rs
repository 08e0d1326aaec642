// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job directory scanner: discovers role descriptor/log file pairs.

use std::path::{Path, PathBuf};

/// One discovered role: its id and the descriptor/log paths derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleEntry {
    /// Digits as they appear in the filename (leading zeros preserved).
    pub id: String,
    pub descriptor_path: PathBuf,
    pub log_path: PathBuf,
}

/// Extract the numeric id from a `role-<n>.md` filename.
fn role_id(name: &str) -> Option<&str> {
    let digits = name.strip_prefix("role-")?.strip_suffix(".md")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits)
}

/// List `role-<n>.md` files in `job_dir`, ordered by ascending numeric id.
///
/// The paired log path is derived as `log/role-<n>.log`. An unreadable
/// directory yields an empty list; this is a building block, not an error
/// boundary.
pub fn scan_roles(job_dir: &Path) -> Vec<RoleEntry> {
    let Ok(entries) = std::fs::read_dir(job_dir) else {
        return Vec::new();
    };

    let mut roles: Vec<RoleEntry> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name();
            let id = role_id(name.to_str()?)?.to_owned();
            let log_path = job_dir.join("log").join(format!("role-{id}.log"));
            Some(RoleEntry { id, descriptor_path: entry.path(), log_path })
        })
        .collect();

    // Numeric, not lexicographic: role-10 sorts after role-9.
    roles.sort_by_key(|r| r.id.parse::<u64>().unwrap_or(u64::MAX));
    roles
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
