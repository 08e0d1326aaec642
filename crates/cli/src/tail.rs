// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tail reads: the trailing byte window of a log file, never the whole file.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Byte budget for log tails included in continuous snapshots.
pub const SNAPSHOT_BUDGET: u64 = 64 * 1024;

/// Byte budget for on-demand full-tail fetches (`GET /log`).
pub const FETCH_BUDGET: u64 = 256 * 1024;

/// The trailing window of a file plus its total size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogTail {
    pub content: String,
    pub size: u64,
}

/// Read at most `budget` bytes from the end of `path`.
///
/// A missing or unreadable file yields `("", 0)`. The window may begin
/// mid-line or mid-character; no boundary alignment is performed and a torn
/// multi-byte sequence decodes lossily. The next snapshot cycle
/// self-corrects.
pub fn read_tail(path: &Path, budget: u64) -> LogTail {
    let Ok(mut file) = std::fs::File::open(path) else {
        return LogTail::default();
    };
    let Ok(meta) = file.metadata() else {
        return LogTail::default();
    };
    let size = meta.len();
    let start = size.saturating_sub(budget);
    if file.seek(SeekFrom::Start(start)).is_err() {
        return LogTail::default();
    }

    let mut buf = Vec::with_capacity(size.min(budget) as usize);
    if file.take(budget).read_to_end(&mut buf).is_err() {
        return LogTail::default();
    }

    LogTail { content: String::from_utf8_lossy(&buf).into_owned(), size }
}

#[cfg(test)]
#[path = "tail_tests.rs"]
mod tests;
