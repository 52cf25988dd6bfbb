mod cli;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use logward_core::config::LogwardConfig;
use logward_core::error::{ConfigError, LogwardError};
use logward_syslog::{BridgeSettings, SyslogBridge};

use crate::cli::BridgeCli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = BridgeCli::parse();

    // 로깅 초기화
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,logward=debug".to_owned()),
        )
        .json()
        .init();

    // 브리지는 설정 파일 없이도 기본값 + 환경변수만으로 동작한다
    let mut config = match LogwardConfig::load(&cli.config).await {
        Ok(config) => config,
        Err(LogwardError::Config(ConfigError::FileNotFound { path })) => {
            tracing::info!(path, "config file not found, using defaults and env overrides");
            let mut config = LogwardConfig::default();
            config.apply_env_overrides();
            config
        }
        Err(e) => {
            return Err(anyhow::anyhow!(e))
                .with_context(|| format!("failed to load config from {}", cli.config.display()));
        }
    };
    if let Some(listen_addr) = cli.listen_addr {
        config.bridge.listen_addr = listen_addr;
    }
    if let Some(ingest_url) = cli.ingest_url {
        config.bridge.ingest_url = ingest_url;
    }
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!("logward-bridge starting");

    let settings = BridgeSettings {
        listen_addr: config.bridge.listen_addr.clone(),
        max_datagram_bytes: config.bridge.max_datagram_bytes,
        ingest_url: config.bridge.ingest_url.clone(),
        forward_timeout: Duration::from_secs(config.bridge.forward_timeout_secs),
    };
    let mut bridge =
        SyslogBridge::new(settings).map_err(|e| anyhow::anyhow!("failed to build bridge: {e}"))?;

    // 종료 시그널 → 수신 루프 취소
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            signal_cancel.cancel();
        }
    });

    bridge
        .run(cancel)
        .await
        .map_err(|e| anyhow::anyhow!("bridge terminated: {e}"))?;

    tracing::info!("logward-bridge shut down");
    Ok(())
}
