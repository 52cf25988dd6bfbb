//! Router assembly.

use std::time::Instant;

use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;

use crate::api;
use crate::state::AppState;

/// Build the HTTP application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/ingest", axum::routing::post(api::ingest))
        .route("/logs", get(api::list_logs))
        .route("/clients", get(api::list_clients).post(api::upsert_client))
        .route("/clients/count", get(api::client_count))
        .route("/alerts", get(api::list_alerts))
        .with_state(state)
        .layer(middleware::from_fn(request_logging))
}

/// Log one line per request with a fresh trace id.
async fn request_logging(request: Request, next: Next) -> Response {
    let trace_id = uuid::Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::debug!(
        %trace_id,
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "http request"
    );
    response
}
