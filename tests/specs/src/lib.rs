// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `jobview` binary against a temporary job directory and
//! exercises it over HTTP, including the `/events` push stream.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

/// Resolve the path to the compiled `jobview` binary.
pub fn jobview_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("jobview")
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// A running `jobview` process that is killed on drop.
pub struct JobviewProcess {
    child: Child,
    port: u16,
}

impl JobviewProcess {
    /// Spawn the binary against `job_dir` with extra environment variables
    /// (used to tighten the timing knobs).
    pub fn start(job_dir: &Path, env: &[(&str, &str)]) -> anyhow::Result<Self> {
        let port = free_port()?;
        let mut command = Command::new(jobview_binary());
        command
            .arg(job_dir)
            .arg("--port")
            .arg(port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        for (key, value) in env {
            command.env(key, value);
        }
        let child = command.spawn()?;
        Ok(Self { child, port })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Poll `GET /` until the server answers.
    ///
    /// The viewer page does not count as a liveness ping, so idle-shutdown
    /// tests are not kept alive by the probe.
    pub async fn wait_ready(&self, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Ok(resp) = reqwest::get(format!("{}/", self.base_url())).await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("jobview never became ready on port {}", self.port);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Wait for the process to exit on its own, returning its exit code.
    pub async fn wait_exit(&mut self, timeout: Duration) -> anyhow::Result<Option<i32>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Ok(status.code());
            }
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("jobview did not exit within {timeout:?}");
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Drop for JobviewProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Incremental reader for a `text/event-stream` response.
///
/// Accumulates body chunks and yields the `data:` payload of each event,
/// skipping keep-alive comments.
pub struct SseReader {
    response: reqwest::Response,
    buffer: String,
}

impl SseReader {
    /// Open the `/events` stream of a running process.
    pub async fn connect(base_url: &str) -> anyhow::Result<Self> {
        let response = reqwest::get(format!("{base_url}/events")).await?;
        anyhow::ensure!(response.status().is_success(), "events: {}", response.status());
        Ok(Self { response, buffer: String::new() })
    }

    /// Next event's `data:` payload, within `timeout`.
    pub async fn next_event(&mut self, timeout: Duration) -> anyhow::Result<String> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            // A complete event ends with a blank line.
            while let Some(end) = self.buffer.find("\n\n") {
                let frame = self.buffer[..end].to_owned();
                self.buffer.drain(..end + 2);
                let data: Vec<&str> =
                    frame.lines().filter_map(|l| l.strip_prefix("data:")).collect();
                if !data.is_empty() {
                    return Ok(data.join("\n").trim_start().to_owned());
                }
                // Comment or keep-alive frame: keep reading.
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            anyhow::ensure!(remaining > Duration::ZERO, "no event within {timeout:?}");
            let chunk = tokio::time::timeout(remaining, self.response.chunk()).await??;
            match chunk {
                Some(bytes) => self.buffer.push_str(&String::from_utf8_lossy(&bytes)),
                None => anyhow::bail!("event stream closed"),
            }
        }
    }
}
