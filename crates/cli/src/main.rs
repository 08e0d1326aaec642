// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use jobview::config::Config;
use jobview::hub::Hub;
use jobview::idle::IdleGate;
use jobview::monitor::{Monitor, MonitorConfig};
use jobview::snapshot::Snapshotter;
use jobview::transport::{build_router, AppState};
use jobview::watch::WatchSet;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    init_tracing(&config);

    if let Err(e) = run(config).await {
        error!("fatal: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    match config.log_format.as_str() {
        "json" => {
            fmt::fmt().with_env_filter(filter).json().init();
        }
        _ => {
            fmt::fmt().with_env_filter(filter).init();
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();

    // Channels feeding the monitor loop: raw filesystem wakes and on-demand
    // snapshot requests from late-joining subscribers.
    let (wake_tx, wake_rx) = mpsc::channel(64);
    let (refresh_tx, refresh_rx) = mpsc::channel(4);

    let hub = Arc::new(Hub::new(refresh_tx));
    let idle = Arc::new(IdleGate::new());
    let snapshotter = Snapshotter::new(config.job_dir.clone(), config.snapshot_tail())?;

    let app_state = Arc::new(AppState {
        job_dir: config.job_dir.clone(),
        job_name: config.job_name(),
        fetch_budget: config.fetch_tail(),
        hub: Arc::clone(&hub),
        idle: Arc::clone(&idle),
    });

    // Spawn HTTP server
    let router = build_router(app_state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;
    info!("job: {}", config.job_dir.display());
    info!("listening on http://{local_addr}");
    let sd = shutdown.clone();
    tokio::spawn(async move {
        let result =
            axum::serve(listener, router).with_graceful_shutdown(sd.cancelled_owned()).await;
        if let Err(e) = result {
            error!("HTTP server error: {e}");
        }
    });

    // Spawn signal handler
    {
        let sd = shutdown.clone();
        tokio::spawn(async move {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
            let mut sigint =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).ok();

            tokio::select! {
                _ = async {
                    if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
                } => {
                    info!("received SIGTERM");
                    sd.cancel();
                }
                _ = async {
                    if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
                } => {
                    info!("received SIGINT");
                    sd.cancel();
                }
            }
        });
    }

    if config.open {
        jobview::open::browser(&format!("http://{local_addr}"));
    }

    // Run monitor loop; it returns on idle timeout or shutdown.
    let monitor = Monitor::new(MonitorConfig {
        job_dir: config.job_dir.clone(),
        snapshotter,
        watches: WatchSet::new(wake_tx),
        hub,
        idle,
        wake_rx,
        refresh_rx,
        debounce: config.debounce(),
        idle_poll: config.idle_poll(),
        idle_timeout: config.idle_timeout(),
        shutdown: shutdown.clone(),
    });
    let exit = monitor.run().await;
    info!(?exit, "monitor stopped");
    shutdown.cancel();

    Ok(())
}
