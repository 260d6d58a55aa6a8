mod action;
mod app;
mod app_state;
mod component;
mod components;
mod core;
mod dispatch;
mod display;
mod intent;
mod prompt;
mod sync;
mod theme;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use scrobble_proto::client::HttpClient;
use scrobble_proto::config::Config;

use crate::app_state::AppState;
use crate::core::{ClientCore, ClientEvent};
use crate::prompt::{ChannelPrompt, PromptRequest};

/// Suppress connection-level DEBUG from the HTTP client internals.
const DEFAULT_LOG_FILTER: &str = "info,hyper_util=warn,reqwest=warn,hyper=warn";

/// Terminal control client for a scrobbling server.
#[derive(Debug, Parser)]
#[command(name = "scrobctl", version, about)]
struct Args {
    /// Server base URL (overrides `[server] base_url`).
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Config file to use instead of the platform default.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `scrobctl=trace` (overrides RUST_LOG).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Where to write the log.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Status poll interval in milliseconds (overrides `[polling] interval_ms`).
    #[arg(long, value_name = "MS")]
    poll_interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // ── Logging ──────────────────────────────────────────────────────────────
    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(scrobble_proto::platform::log_file);
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let log_filter = args
        .log_level
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("scrobctl log: {}", log_path.display());
    info!("scrobctl starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let loaded = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        warn!("config: {:#}; using defaults", e);
        Config::default()
    });
    if let Some(url) = args.server {
        config.server.base_url = url;
    }
    if let Some(ms) = args.poll_interval_ms {
        config.polling.interval_ms = ms;
    }

    let api = Arc::new(HttpClient::new(&config.server)?);
    info!("server {}", api.base_url());

    // ── Channels (TUI ↔ ClientCore) ──────────────────────────────────────────
    let (prompt_tx, prompt_rx) = mpsc::channel::<PromptRequest>(16);
    let (event_tx, event_rx) = mpsc::channel::<ClientEvent>(64);

    // ── Spawn ClientCore event loop ──────────────────────────────────────────
    let (client_core, view_rx) = ClientCore::new(
        Arc::clone(&api),
        Arc::new(ChannelPrompt::new(prompt_tx)),
        config.polling.interval(),
    );
    let core_task = tokio::spawn(async move {
        if let Err(e) = client_core.run(event_rx).await {
            error!("ClientCore exited with error: {}", e);
        }
    });

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let state = AppState::new(api.base_url(), config.ui.show_keys_bar);
    let result = app::App::new(state, event_tx)
        .run(view_rx, prompt_rx)
        .await;

    // The App dropped its sender; the core drains and returns.
    if let Err(e) = core_task.await {
        error!("ClientCore task failed: {}", e);
    }
    info!("scrobctl stopped");

    result
}
