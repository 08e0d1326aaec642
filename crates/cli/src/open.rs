// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch the system browser at the viewer URL.

use std::process::Stdio;

use tracing::debug;

/// Open `url` in the platform's default browser.
///
/// Best-effort: a missing opener is logged at debug and otherwise ignored.
pub fn browser(url: &str) {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(not(target_os = "macos"))]
    let opener = "xdg-open";

    match std::process::Command::new(opener)
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => debug!(url, "opened browser"),
        Err(e) => debug!("failed to open browser: {e}"),
    }
}
