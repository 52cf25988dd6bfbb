//! Periodic archive job scheduling.
//!
//! One tokio task ticks on the configured interval and runs the
//! archiver on a blocking thread. Ticks run strictly sequentially, so
//! the job never races with itself; it may run concurrently with
//! ingestion, which is safe because it only touches rows older than
//! the cutoff computed at each run's start.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use logward_archive::Archiver;
use logward_core::config::ArchiveConfig;
use logward_store::Store;

/// Spawn the background archive task.
///
/// The first tick fires immediately, so aged rows left over from a
/// previous run are archived right after startup.
pub fn spawn_archive_task(
    store: Arc<Store>,
    config: ArchiveConfig,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let archiver = Archiver::new(&config.root_dir, config.retention_days);
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(config.interval_secs));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let archiver = archiver.clone();
                    let store = store.clone();
                    let result = tokio::task::spawn_blocking(move || {
                        archiver.run(&store, Utc::now())
                    })
                    .await;

                    match result {
                        Ok(Ok(0)) => tracing::debug!("archive tick: nothing to archive"),
                        Ok(Ok(count)) => tracing::info!(count, "archive tick completed"),
                        Ok(Err(e)) => tracing::error!(error = %e, "archive run failed, will retry next tick"),
                        Err(e) => tracing::error!(error = %e, "archive task panicked"),
                    }
                }
                _ = cancel.cancelled() => {
                    tracing::debug!("archive task shutting down");
                    break;
                }
            }
        }
    })
}
