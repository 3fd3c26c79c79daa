//! HTTP surface of the monitor service.

use axum::extract::State;
use axum::http::header::HeaderName;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use std::sync::Arc;
use tracing::error;

use beacon_core::{aggregate, capture, ProcessAdapter, ProjectRegistry, ScanConfig};

pub struct MonitorState {
    pub registry: ProjectRegistry,
    pub scan_config: ScanConfig,
    pub adapter: Box<dyn ProcessAdapter>,
}

pub fn build_router(state: Arc<MonitorState>) -> Router {
    Router::new()
        .route("/api/ia-usage", get(usage))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
}

// The original service answered cross-origin dashboards directly, so
// every response carries these.
fn cors_headers() -> [(HeaderName, &'static str); 2] {
    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "GET"),
    ]
}

/// Reports the current snapshot. The process-table scan is blocking
/// work, so it runs off the async workers; a failed task degrades to an
/// empty snapshot rather than a non-200 response.
async fn usage(State(state): State<Arc<MonitorState>>) -> impl IntoResponse {
    let task_state = state.clone();
    let snapshot = tokio::task::spawn_blocking(move || {
        capture(
            task_state.adapter.as_ref(),
            &task_state.scan_config,
            &task_state.registry,
        )
    })
    .await;

    let snapshot = match snapshot {
        Ok(snapshot) => snapshot,
        Err(err) => {
            error!(error = %err, "snapshot task failed");
            aggregate(Vec::new(), &state.registry, Utc::now())
        }
    };
    (cors_headers(), Json(snapshot))
}

async fn health() -> impl IntoResponse {
    (cors_headers(), Json(serde_json::json!({"status": "ok"})))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, cors_headers(), "Not found")
}
