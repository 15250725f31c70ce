/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Live stream subscriptions logged until shutdown
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use hydro_sdk::HydroWatcher;
use hydro_watch::{LogListener, WatchConfig};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hydro-watch", version, about = "Hydro exchange stream watcher")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: PathBuf,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Validate the configuration and exit without connecting
    #[arg(long = "dry-run")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    info!(
        config_path = %args.config_path.display(),
        dry_run = args.dry_run,
        "starting hydro-watch"
    );

    let config = load_config(&args.config_path)?;
    info!(
        subscriptions = config.subscriptions.len(),
        "configuration loaded"
    );

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let listener = Arc::new(LogListener::new());
    let watcher = HydroWatcher::with_config(config.watcher_config(), listener.clone());

    for subscription in &config.subscriptions {
        info!(
            channel = %subscription.channel,
            markets = ?subscription.market_ids,
            "subscribing"
        );
        watcher.subscribe(subscription.channel, subscription.market_ids.iter().cloned());
    }

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    shutdown.cancelled().await;

    watcher.close().await;

    let counts = listener.counts();
    info!(
        connection_attempts = watcher.connection_attempts(),
        tickers = counts.tickers,
        snapshots = counts.snapshots,
        level_updates = counts.level_updates,
        order_events = counts.order_events,
        trade_events = counts.trade_events,
        "watcher closed"
    );

    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level)
        .with_context(|| format!("invalid log level {log_level:?}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("install tracing subscriber")
}

fn load_config(path: &Path) -> Result<WatchConfig> {
    let path_str = path.to_str().context("config path must be valid utf-8")?;
    WatchConfig::from_file(path_str).context("load config")
}

/// Cancels `shutdown` on the first SIGINT or SIGTERM
fn setup_signal_handlers(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let signal = wait_for_signal().await;
        info!(signal, "shutdown signal received");
        shutdown.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            warn!(error = %err, "SIGTERM handler unavailable; listening for SIGINT only");
            return interrupt().await;
        }
    };
    tokio::select! {
        name = interrupt() => name,
        _ = terminate.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    interrupt().await
}

async fn interrupt() -> &'static str {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "SIGINT handler unavailable");
        std::future::pending::<()>().await;
    }
    "SIGINT"
}
