// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role descriptor parsing: `- key: value` fields plus a free-text summary
//! section, all fail-soft. A role's descriptor may legitimately not exist
//! yet because its worker hasn't started.

use std::path::Path;

use regex::Regex;

/// Marker for the free-text summary section of a descriptor.
const SUMMARY_HEADING: &str = "## 결과 요약";

/// Structured fields of one role descriptor.
///
/// All fields are raw text exactly as the worker wrote them; `"-"` stands in
/// for anything absent. Use [`Status::parse`] for a typed view of `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDescriptor {
    pub status: String,
    pub locked: String,
    pub locked_by: String,
    pub goal: String,
    pub target: String,
    pub summary: String,
}

impl Default for RoleDescriptor {
    fn default() -> Self {
        Self {
            status: "-".to_owned(),
            locked: "-".to_owned(),
            locked_by: "-".to_owned(),
            goal: "-".to_owned(),
            target: "-".to_owned(),
            summary: String::new(),
        }
    }
}

/// Typed view of the `status` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    InProgress,
    Completed,
    Failed,
}

impl Status {
    /// Parse a raw status value; absent or unrecognized values read as idle.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Idle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Compiled descriptor patterns. Build once and reuse across snapshot cycles.
#[derive(Debug, Clone)]
pub struct DescriptorParser {
    field: Regex,
    summary: Regex,
}

impl DescriptorParser {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            field: Regex::new(r"(?m)^- (\w+):\s*(.*)$")?,
            summary: Regex::new(&format!(r"(?sm)^{SUMMARY_HEADING}\n(.*?)(?:\n##|\z)"))?,
        })
    }

    /// Parse the descriptor file at `path`.
    ///
    /// An unreadable or missing file yields the all-default descriptor.
    pub fn parse_file(&self, path: &Path) -> RoleDescriptor {
        match std::fs::read_to_string(path) {
            Ok(text) => self.parse_text(&text),
            Err(_) => RoleDescriptor::default(),
        }
    }

    /// Parse descriptor text. Unmatched keys keep their defaults; the first
    /// occurrence of a key wins.
    pub fn parse_text(&self, text: &str) -> RoleDescriptor {
        let mut fields: [(&str, Option<&str>); 5] = [
            ("status", None),
            ("locked", None),
            ("locked_by", None),
            ("goal", None),
            ("target", None),
        ];
        for caps in self.field.captures_iter(text) {
            let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let value = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
            if let Some(slot) = fields.iter_mut().find(|(k, v)| *k == key && v.is_none()) {
                slot.1 = Some(value);
            }
        }
        let [status, locked, locked_by, goal, target] =
            fields.map(|(_, v)| v.unwrap_or("-").to_owned());

        let summary = self
            .summary
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_owned())
            .unwrap_or_default();

        RoleDescriptor { status, locked, locked_by, goal, target, summary }
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
