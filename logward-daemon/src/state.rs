//! Shared application state for the HTTP layer.

use logward_ingest::IngestService;

/// State handed to every axum handler.
///
/// The ingest service owns the store handle; handlers never touch the
/// store directly.
#[derive(Clone)]
pub struct AppState {
    /// Ingestion, directory, and query entry points.
    pub ingest: IngestService,
    /// Default `limit` for log queries when the caller omits one.
    pub default_query_limit: usize,
}
