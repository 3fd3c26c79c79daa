//! Fetching the usage snapshot from the remote monitor.

use std::time::Duration;

/// Where the monitor lives when the dashboard runs off-host.
pub const DEFAULT_UPSTREAM: &str = "http://46.224.228.65:3847/api/ia-usage";

/// Overall budget for one proxied fetch, connect through body.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a proxied fetch produced no snapshot. [`ProxyFailure::label`] is
/// the string reported in the degraded snapshot's `error` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyFailure {
    Unreachable,
    Timeout,
    InvalidBody,
}

impl ProxyFailure {
    pub fn label(self) -> &'static str {
        match self {
            ProxyFailure::Unreachable => "VPS monitor unreachable",
            ProxyFailure::Timeout => "VPS monitor timeout",
            ProxyFailure::InvalidBody => "Invalid response from VPS",
        }
    }
}

/// Shared client for proxied fetches, carrying the fetch timeout.
pub fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()
}

/// Fetches the upstream snapshot and returns its body verbatim.
///
/// The body must parse as JSON to be trusted; beyond that it is passed
/// through byte-for-byte, and the upstream HTTP status is not
/// inspected. Anything else maps to a [`ProxyFailure`].
pub async fn fetch_snapshot(client: &reqwest::Client, url: &str) -> Result<String, ProxyFailure> {
    let response = client.get(url).send().await.map_err(classify_error)?;
    let body = response.text().await.map_err(classify_error)?;
    if serde_json::from_str::<serde_json::Value>(&body).is_err() {
        return Err(ProxyFailure::InvalidBody);
    }
    Ok(body)
}

fn classify_error(err: reqwest::Error) -> ProxyFailure {
    if err.is_timeout() {
        ProxyFailure::Timeout
    } else {
        ProxyFailure::Unreachable
    }
}
