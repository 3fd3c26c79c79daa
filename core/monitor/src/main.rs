//! Beacon monitor entrypoint.
//!
//! Runs on the host whose sessions are being reported and serves the
//! usage snapshot over plain HTTP. The dashboard service proxies this
//! endpoint when it runs off-host.

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use beacon_core::config::ENV_DEBUG_LOG;
use beacon_core::{load_registry, resolve_port, scan_config_from_env, SysinfoProcessAdapter};

mod server;

use server::{build_router, MonitorState};

const DEFAULT_PORT: u16 = 3847;

#[derive(Parser, Debug)]
#[command(name = "beacon-monitor")]
struct Args {
    /// Listen port (falls back to PORT, then 3847)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging();

    let port = resolve_port(args.port, DEFAULT_PORT);
    let state = Arc::new(MonitorState {
        registry: load_registry(),
        scan_config: scan_config_from_env(),
        adapter: Box::new(SysinfoProcessAdapter),
    });
    info!(
        projects = state.registry.len(),
        marker = %state.scan_config.marker,
        "Monitor state initialized"
    );

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, port, "Failed to bind monitor port");
            std::process::exit(1);
        }
    };

    info!(port, endpoint = %format!("http://localhost:{port}/api/ia-usage"), "Beacon monitor started");

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
    {
        error!(error = %err, "Monitor server error");
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
