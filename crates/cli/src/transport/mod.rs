// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport: thin glue between viewers and the monitor pipeline.

pub mod http;
pub mod state;

pub use state::AppState;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// The embedded viewer page. Presentation is a client concern; the page only
/// consumes the JSON snapshot contract.
pub(crate) const VIEWER_HTML: &str = include_str!("../../assets/viewer.html");

/// Build the axum `Router` with all viewer routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(http::index))
        .route("/events", get(http::events))
        .route("/log", get(http::log_tail))
        .route("/heartbeat", get(http::heartbeat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
