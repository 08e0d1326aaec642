// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers: viewer page, snapshot event stream, log fetch, heartbeat.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Html;
use futures_util::stream::Stream;
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;

use crate::tail::read_tail;
use crate::transport::state::AppState;
use crate::transport::VIEWER_HTML;

/// `GET /` — the viewer page with the job name interpolated.
pub async fn index(State(s): State<Arc<AppState>>) -> Html<String> {
    Html(VIEWER_HTML.replace("__JOB_DIR__", &s.job_name))
}

/// `GET /events` — server-push snapshot stream.
///
/// A new subscriber receives the most recent snapshot immediately (or
/// triggers one if none exists yet), then one event per state change.
/// Dropping the connection drops the receiver, which unsubscribes it.
pub async fn events(
    State(s): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (replay, rx) = s.hub.subscribe();

    let replay = futures_util::stream::iter(
        replay.into_iter().map(|payload| Ok::<_, Infallible>(Event::default().data(payload))),
    );
    let live = BroadcastStream::new(rx).filter_map(|msg| async move {
        // A lagged receiver skips ahead; the next snapshot is complete state.
        msg.ok().map(|payload| Ok::<_, Infallible>(Event::default().data(payload)))
    });

    Sse::new(replay.chain(live))
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("ping"))
}

/// Query parameters for the log fetch endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    #[serde(default)]
    pub role: Option<String>,
}

/// `GET /log?role=<id>` — large-budget tail of one role's log, plain text.
/// Also counts as a liveness ping. A missing or malformed role id reads as
/// absent and yields an empty body.
pub async fn log_tail(State(s): State<Arc<AppState>>, Query(q): Query<LogQuery>) -> String {
    s.idle.ping();

    let Some(id) = q.role.filter(|r| !r.is_empty() && r.bytes().all(|b| b.is_ascii_digit())) else {
        return String::new();
    };
    let path = s.job_dir.join("log").join(format!("role-{id}.log"));
    read_tail(&path, s.fetch_budget).content
}

/// `GET /heartbeat` — record a viewer liveness ping.
pub async fn heartbeat(State(s): State<Arc<AppState>>) -> &'static str {
    s.idle.ping();
    "ok"
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
