use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use logward_core::config::LogwardConfig;
use logward_daemon::cli::DaemonCli;
use logward_daemon::state::AppState;
use logward_daemon::{app, logging, metrics_server, scheduler};
use logward_ingest::{AlertEvaluator, IngestService};
use logward_store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    let mut config = LogwardConfig::load(&cli.config)
        .await
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format;
    }
    config.validate()?;

    if cli.validate {
        println!("configuration ok: {}", cli.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!("logward-daemon starting");

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    let store = Store::open(&config.store.path)
        .map_err(|e| anyhow::anyhow!("failed to open store: {e}"))?;
    let store = Arc::new(store);

    let evaluator = AlertEvaluator::new(
        config.alerts.error_burst_threshold,
        config.alerts.window_secs,
    );
    let service = IngestService::new(store.clone(), evaluator);
    let state = AppState {
        ingest: service,
        default_query_limit: config.server.default_query_limit,
    };

    let cancel = CancellationToken::new();
    let archive_task = if config.archive.enabled {
        Some(scheduler::spawn_archive_task(
            store.clone(),
            config.archive.clone(),
            cancel.clone(),
        ))
    } else {
        tracing::info!("archive job disabled by configuration");
        None
    };

    let router = app::build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(bind_addr = %config.server.bind_addr, "http api listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("http server error")?;

    tracing::info!("shutdown signal received");
    cancel.cancel();
    if let Some(task) = archive_task {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "failed to join archive task");
        }
    }

    tracing::info!("logward-daemon shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
