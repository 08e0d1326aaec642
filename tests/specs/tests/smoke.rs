// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `jobview` binary against a
//! temporary job directory and exercise it over HTTP.

use std::time::Duration;

use jobview::descriptor::Status;
use jobview_specs::{JobviewProcess, SseReader};

const TIMEOUT: Duration = Duration::from_secs(10);

/// Generous idle timeout so tests that aren't about idle shutdown never race
/// their own process reaper.
const NO_IDLE: &[(&str, &str)] = &[("JOBVIEW_IDLE_TIMEOUT_MS", "60000")];

#[tokio::test]
async fn serves_viewer_page_with_job_name() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let jobview = JobviewProcess::start(dir.path(), NO_IDLE)?;
    jobview.wait_ready(TIMEOUT).await?;

    let body = reqwest::get(format!("{}/", jobview.base_url())).await?.text().await?;
    let job_name = dir.path().file_name().map(|n| n.to_string_lossy().into_owned());
    assert!(body.contains(job_name.as_deref().unwrap_or_default()));
    Ok(())
}

#[tokio::test]
async fn heartbeat_acknowledges() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let jobview = JobviewProcess::start(dir.path(), NO_IDLE)?;
    jobview.wait_ready(TIMEOUT).await?;

    let body = reqwest::get(format!("{}/heartbeat", jobview.base_url())).await?.text().await?;
    assert_eq!(body, "ok");
    Ok(())
}

#[tokio::test]
async fn events_stream_delivers_snapshot_then_changes() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("role-1.md"), "- status: idle\n")?;

    let jobview = JobviewProcess::start(dir.path(), NO_IDLE)?;
    jobview.wait_ready(TIMEOUT).await?;

    let mut events = SseReader::connect(&jobview.base_url()).await?;

    // A fresh subscriber receives the current snapshot without any change.
    let first: serde_json::Value = serde_json::from_str(&events.next_event(TIMEOUT).await?)?;
    assert_eq!(first["roles"][0]["id"], "1");
    assert_eq!(first["roles"][0]["status"], "idle");

    // A descriptor edit arrives as a push.
    std::fs::write(dir.path().join("role-1.md"), "- status: in_progress\n- locked_by: 4821\n")?;
    let second: serde_json::Value = serde_json::from_str(&events.next_event(TIMEOUT).await?)?;
    let status = second["roles"][0]["status"].as_str().unwrap_or_default();
    assert_eq!(Status::parse(status), Status::InProgress);
    assert_eq!(second["roles"][0]["locked_by"], "4821");
    Ok(())
}

#[tokio::test]
async fn done_sentinel_is_pushed() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let jobview = JobviewProcess::start(dir.path(), NO_IDLE)?;
    jobview.wait_ready(TIMEOUT).await?;

    let mut events = SseReader::connect(&jobview.base_url()).await?;
    let first: serde_json::Value = serde_json::from_str(&events.next_event(TIMEOUT).await?)?;
    assert!(first["done"].is_null());

    std::fs::write(dir.path().join(".done"), "all roles finished\n")?;
    let second: serde_json::Value = serde_json::from_str(&events.next_event(TIMEOUT).await?)?;
    assert_eq!(second["done"], "all roles finished");
    Ok(())
}

#[tokio::test]
async fn log_endpoint_returns_tail() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("role-2.md"), "- status: in_progress\n")?;
    std::fs::create_dir(dir.path().join("log"))?;
    std::fs::write(dir.path().join("log").join("role-2.log"), "line a\nline b\n")?;

    let jobview = JobviewProcess::start(dir.path(), NO_IDLE)?;
    jobview.wait_ready(TIMEOUT).await?;

    let body =
        reqwest::get(format!("{}/log?role=2", jobview.base_url())).await?.text().await?;
    assert_eq!(body, "line a\nline b\n");
    Ok(())
}

#[tokio::test]
async fn idle_timeout_exits_cleanly() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut jobview = JobviewProcess::start(
        dir.path(),
        &[("JOBVIEW_IDLE_TIMEOUT_MS", "2000"), ("JOBVIEW_IDLE_POLL_MS", "100")],
    )?;
    jobview.wait_ready(TIMEOUT).await?;

    // No heartbeats: the process reaps itself.
    let code = jobview.wait_exit(TIMEOUT).await?;
    assert_eq!(code, Some(0));
    Ok(())
}

#[tokio::test]
async fn heartbeats_keep_the_process_alive() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut jobview = JobviewProcess::start(
        dir.path(),
        &[("JOBVIEW_IDLE_TIMEOUT_MS", "1500"), ("JOBVIEW_IDLE_POLL_MS", "100")],
    )?;
    jobview.wait_ready(TIMEOUT).await?;

    let url = format!("{}/heartbeat", jobview.base_url());
    for _ in 0..10 {
        reqwest::get(&url).await?;
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    // Twice the timeout window elapsed; pings kept it alive.
    assert!(jobview.wait_exit(Duration::from_millis(0)).await.is_err());

    // Silence reaps it.
    let code = jobview.wait_exit(TIMEOUT).await?;
    assert_eq!(code, Some(0));
    Ok(())
}

#[tokio::test]
async fn missing_job_dir_is_startup_fatal() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("does-not-exist");
    let mut jobview = JobviewProcess::start(&missing, &[])?;

    let code = jobview.wait_exit(TIMEOUT).await?;
    assert_eq!(code, Some(2));
    Ok(())
}
