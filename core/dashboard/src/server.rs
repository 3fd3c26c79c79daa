//! HTTP surface of the dashboard service: the usage endpoint plus the
//! static web UI.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, warn};

use beacon_core::{aggregate, capture, degraded, ProcessAdapter, ProjectRegistry, ScanConfig};

use crate::proxy::fetch_snapshot;

/// How `/api/ia-usage` is answered, decided once at startup.
pub enum UsageMode {
    /// Scan the local process table.
    Direct,
    /// Forward the snapshot produced by the remote monitor.
    Proxy {
        client: reqwest::Client,
        upstream: String,
    },
}

pub struct DashboardState {
    pub registry: ProjectRegistry,
    pub scan_config: ScanConfig,
    pub adapter: Box<dyn ProcessAdapter>,
    pub mode: UsageMode,
}

/// Routes: the usage endpoint, then static assets with `index.html`
/// serving both directory requests and every unmatched path.
pub fn build_router(state: Arc<DashboardState>, static_dir: &Path) -> Router {
    let assets = ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(static_dir.join("index.html")));
    Router::new()
        .route("/api/ia-usage", get(usage))
        .fallback_service(assets)
        .with_state(state)
}

async fn usage(State(state): State<Arc<DashboardState>>) -> Response {
    match &state.mode {
        UsageMode::Proxy { client, upstream } => {
            match fetch_snapshot(client, upstream).await {
                Ok(body) => (
                    [
                        (header::CONTENT_TYPE, "application/json"),
                        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                    ],
                    body,
                )
                    .into_response(),
                Err(failure) => {
                    warn!(error = failure.label(), upstream = %upstream, "proxied snapshot unavailable");
                    degraded_response(&state.registry, failure.label())
                }
            }
        }
        UsageMode::Direct => {
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
            (
                [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
                Json(snapshot),
            )
                .into_response()
        }
    }
}

/// Degraded snapshots still answer 200 so the dashboard keeps
/// rendering; the failure lives in the `error` field.
fn degraded_response(registry: &ProjectRegistry, error: &str) -> Response {
    let snapshot = degraded(registry, Utc::now(), error);
    (
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(snapshot),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::build_client;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use beacon_core::ProcessCandidate;
    use serde_json::Value;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path as mock_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FakeAdapter {
        candidates: Vec<ProcessCandidate>,
    }

    impl ProcessAdapter for FakeAdapter {
        fn processes(&self) -> Result<Vec<ProcessCandidate>, String> {
            Ok(self.candidates.clone())
        }
    }

    fn test_state(candidates: Vec<ProcessCandidate>, mode: UsageMode) -> Arc<DashboardState> {
        Arc::new(DashboardState {
            registry: ProjectRegistry::builtin(),
            scan_config: ScanConfig {
                self_pid: None,
                ..ScanConfig::default()
            },
            adapter: Box::new(FakeAdapter { candidates }),
            mode,
        })
    }

    fn static_fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), "<html>beacon</html>").expect("index");
        std::fs::write(dir.path().join("app.js"), "console.log('beacon');").expect("asset");
        dir
    }

    async fn get_response(
        router: Router,
        uri: &str,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body")
            .to_vec();
        (status, headers, body)
    }

    #[tokio::test]
    async fn direct_mode_reports_local_sessions() {
        let assets = static_fixture();
        let state = test_state(
            vec![ProcessCandidate {
                pid: 10,
                command: "claude".to_string(),
                cwd: Some("/root/projects/closer-crm".to_string()),
                start_time: None,
            }],
            UsageMode::Direct,
        );
        let router = build_router(state, assets.path());
        let (status, headers, body) = get_response(router, "/api/ia-usage").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers.get("access-control-allow-origin").map(|v| v.as_bytes()),
            Some(b"*".as_slice())
        );
        let value: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value["totalActive"], 1);
        assert_eq!(value["health"]["closer-crm"]["active"], true);
    }

    #[tokio::test]
    async fn proxy_mode_passes_upstream_body_verbatim() {
        let mock_server = MockServer::start().await;
        let upstream_body = "{\"totalActive\": 3,\n  \"custom\": \"formatting kept\"}";
        Mock::given(method("GET"))
            .and(mock_path("/api/ia-usage"))
            .respond_with(ResponseTemplate::new(200).set_body_string(upstream_body))
            .mount(&mock_server)
            .await;

        let assets = static_fixture();
        let state = test_state(
            Vec::new(),
            UsageMode::Proxy {
                client: build_client().expect("client"),
                upstream: format!("{}/api/ia-usage", mock_server.uri()),
            },
        );
        let router = build_router(state, assets.path());
        let (status, headers, body) = get_response(router, "/api/ia-usage").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers.get("content-type").map(|v| v.as_bytes()),
            Some(b"application/json".as_slice())
        );
        assert_eq!(
            headers.get("access-control-allow-origin").map(|v| v.as_bytes()),
            Some(b"*".as_slice())
        );
        assert_eq!(String::from_utf8(body).expect("utf8"), upstream_body);
    }

    #[tokio::test]
    async fn proxy_mode_degrades_when_upstream_is_unreachable() {
        // A port that's guaranteed not to be listening
        let assets = static_fixture();
        let state = test_state(
            Vec::new(),
            UsageMode::Proxy {
                client: build_client().expect("client"),
                upstream: "http://127.0.0.1:9/api/ia-usage".to_string(),
            },
        );
        let router = build_router(state, assets.path());
        let (status, _, body) = get_response(router, "/api/ia-usage").await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value["totalActive"], 0);
        assert_eq!(value["sessions"].as_array().map(Vec::len), Some(0));
        assert_eq!(value["error"], "VPS monitor unreachable");
        let health = value["health"].as_object().expect("health object");
        assert_eq!(health.len(), ProjectRegistry::builtin().len());
        assert!(health.values().all(|entry| entry["active"] == false));
    }

    #[tokio::test]
    async fn proxy_mode_degrades_on_invalid_upstream_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(mock_path("/api/ia-usage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let assets = static_fixture();
        let state = test_state(
            Vec::new(),
            UsageMode::Proxy {
                client: build_client().expect("client"),
                upstream: format!("{}/api/ia-usage", mock_server.uri()),
            },
        );
        let router = build_router(state, assets.path());
        let (status, _, body) = get_response(router, "/api/ia-usage").await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value["error"], "Invalid response from VPS");
    }

    #[tokio::test]
    async fn static_assets_are_served_from_the_asset_directory() {
        let assets = static_fixture();
        let state = test_state(Vec::new(), UsageMode::Direct);
        let router = build_router(state, assets.path());
        let (status, _, body) = get_response(router, "/app.js").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).expect("utf8"), "console.log('beacon');");
    }

    #[tokio::test]
    async fn root_serves_the_dashboard_index() {
        let assets = static_fixture();
        let state = test_state(Vec::new(), UsageMode::Direct);
        let router = build_router(state, assets.path());
        let (status, _, body) = get_response(router, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).expect("utf8"), "<html>beacon</html>");
    }

    #[tokio::test]
    async fn unmatched_paths_fall_back_to_the_index() {
        let assets = static_fixture();
        let state = test_state(Vec::new(), UsageMode::Direct);
        let router = build_router(state, assets.path());
        let (status, _, body) = get_response(router, "/projects/closer-crm/details").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).expect("utf8"), "<html>beacon</html>");
    }
}
