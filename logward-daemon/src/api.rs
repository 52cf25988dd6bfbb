//! HTTP API handlers.
//!
//! The ingest endpoint records the caller's transport address as the
//! log's `client_ip`; everything else is a thin mapping between JSON
//! payloads and the ingest service. Failures become 500 responses with
//! an operator-visible log line -- nothing here is interactive.

use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use logward_core::types::{Level, LogFilter};
use logward_ingest::{DirectoryUpdate, IngestRequest};

use crate::state::AppState;

/// `GET /` -- liveness probe.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "status": "logward backend running" }))
}

/// `POST /ingest` -- store one log event.
pub async fn ingest(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<IngestRequest>,
) -> Response {
    let client_ip = addr.ip().to_string();
    match state.ingest.ingest(&client_ip, &payload) {
        Ok(_receipt) => Json(json!({
            "status": "log stored",
            "client_ip": client_ip,
        }))
        .into_response(),
        Err(e) => internal_error("failed to ingest log", e),
    }
}

/// Query-string filters for `GET /logs`.
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub level: Option<String>,
    pub source: Option<String>,
    pub search: Option<String>,
    pub client_ip: Option<String>,
    pub limit: Option<usize>,
}

/// `GET /logs` -- newest-first log listing with optional filters.
pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Response {
    let level = match &query.level {
        Some(raw) => match Level::from_str_loose(raw) {
            Some(level) => Some(level),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    format!("unknown level '{raw}', expected ERROR, WARN or INFO"),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let filter = LogFilter {
        level,
        source: query.source,
        search: query.search,
        client_ip: query.client_ip,
        limit: query.limit.unwrap_or(state.default_query_limit),
    };

    match state.ingest.query_logs(&filter) {
        Ok(logs) => Json(logs).into_response(),
        Err(e) => internal_error("failed to query logs", e),
    }
}

/// `POST /clients` -- directory write (find-or-create by client_id, then ip).
pub async fn upsert_client(
    State(state): State<AppState>,
    Json(update): Json<DirectoryUpdate>,
) -> Response {
    if update.ip.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "ip must not be empty").into_response();
    }
    match state.ingest.upsert_directory(&update) {
        Ok(client) => Json(client).into_response(),
        Err(e) => internal_error("failed to update client directory", e),
    }
}

/// `GET /clients` -- directory listing ordered by address.
pub async fn list_clients(State(state): State<AppState>) -> Response {
    match state.ingest.list_clients() {
        Ok(clients) => Json(clients).into_response(),
        Err(e) => internal_error("failed to list clients", e),
    }
}

/// `GET /clients/count` -- distinct client addresses seen in the logs.
pub async fn client_count(State(state): State<AppState>) -> Response {
    match state.ingest.distinct_client_count() {
        Ok(count) => Json(json!({ "count": count })).into_response(),
        Err(e) => internal_error("failed to count clients", e),
    }
}

/// `GET /alerts` -- open alerts ordered by most recently seen.
pub async fn list_alerts(State(state): State<AppState>) -> Response {
    match state.ingest.list_alerts() {
        Ok(alerts) => Json(alerts).into_response(),
        Err(e) => internal_error("failed to list alerts", e),
    }
}

fn internal_error(context: &str, err: logward_ingest::IngestServiceError) -> Response {
    tracing::error!(error = %err, context, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, context.to_owned()).into_response()
}
