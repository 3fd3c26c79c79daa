//! Beacon dashboard entrypoint.
//!
//! Serves the web UI and the usage endpoint. On the monitored host it
//! scans the process table directly; on a managed platform it proxies
//! the snapshot from the remote monitor instead.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use beacon_core::config::ENV_DEBUG_LOG;
use beacon_core::{
    env_present, env_value, load_registry, resolve_port, scan_config_from_env,
    SysinfoProcessAdapter,
};

mod proxy;
mod server;

use proxy::{build_client, DEFAULT_UPSTREAM};
use server::{build_router, DashboardState, UsageMode};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STATIC_DIR: &str = "static";

// Managed-platform deployments have no process table worth scanning;
// either marker switches the dashboard to proxy mode.
const ENV_RAILWAY_ENVIRONMENT: &str = "RAILWAY_ENVIRONMENT";
const ENV_RAILWAY_SERVICE_ID: &str = "RAILWAY_SERVICE_ID";
const ENV_UPSTREAM: &str = "VPS_MONITOR_URL";
const ENV_STATIC_DIR: &str = "BEACON_STATIC_DIR";

#[derive(Parser, Debug)]
#[command(name = "beacon-dashboard")]
struct Args {
    /// Listen port (falls back to PORT, then 8080)
    #[arg(long)]
    port: Option<u16>,
    /// Dashboard asset directory (falls back to BEACON_STATIC_DIR, then "static")
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging();

    let port = resolve_port(args.port, DEFAULT_PORT);
    let static_dir = args
        .static_dir
        .or_else(|| env_value(ENV_STATIC_DIR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

    let proxying = env_present(ENV_RAILWAY_ENVIRONMENT) || env_present(ENV_RAILWAY_SERVICE_ID);
    let mode = if proxying {
        let upstream = env_value(ENV_UPSTREAM).unwrap_or_else(|| DEFAULT_UPSTREAM.to_string());
        let client = match build_client() {
            Ok(client) => client,
            Err(err) => {
                error!(error = %err, "Failed to build proxy HTTP client");
                std::process::exit(1);
            }
        };
        info!(upstream = %upstream, "Usage mode: proxy to remote monitor");
        UsageMode::Proxy { client, upstream }
    } else {
        info!("Usage mode: local detection");
        UsageMode::Direct
    };

    let state = Arc::new(DashboardState {
        registry: load_registry(),
        scan_config: scan_config_from_env(),
        adapter: Box::new(SysinfoProcessAdapter),
        mode,
    });
    let app = build_router(state, &static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, port, "Failed to bind dashboard port");
            std::process::exit(1);
        }
    };

    info!(port, static_dir = %static_dir.display(), "Beacon dashboard started");

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
    {
        error!(error = %err, "Dashboard server error");
        std::process::exit(1);
    }
}

fn init_logging() {
    let debug_enabled = std::env::var(ENV_DEBUG_LOG)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
