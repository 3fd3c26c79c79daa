//! Environment-driven configuration shared by the service binaries.
//!
//! Precedence is flag, then environment, then default. Anything that
//! fails to load falls back instead of preventing startup.

use crate::process::ScanConfig;
use crate::registry::ProjectRegistry;
use std::path::PathBuf;

pub const ENV_PORT: &str = "PORT";
pub const ENV_PROJECTS: &str = "BEACON_PROJECTS";
pub const ENV_SCAN_MARKER: &str = "BEACON_SCAN_MARKER";
pub const ENV_SCAN_EXCLUDE: &str = "BEACON_SCAN_EXCLUDE";
pub const ENV_DEBUG_LOG: &str = "BEACON_DEBUG_LOG";

/// True when the variable is set to a non-blank value.
pub fn env_present(key: &str) -> bool {
    env_value(key).is_some()
}

/// The variable's value when set and non-blank.
pub fn env_value(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

/// Listen port: `--port` flag, then `PORT`, then the service default.
pub fn resolve_port(flag: Option<u16>, default_port: u16) -> u16 {
    resolve_port_from(flag, env_value(ENV_PORT), default_port)
}

fn resolve_port_from(flag: Option<u16>, env_port: Option<String>, default_port: u16) -> u16 {
    if let Some(port) = flag {
        return port;
    }
    if let Some(value) = env_port {
        match value.trim().parse() {
            Ok(port) => return port,
            Err(_) => {
                tracing::warn!(value = %value, "ignoring unparsable PORT value");
            }
        }
    }
    default_port
}

/// Loads the project registry: `BEACON_PROJECTS` if set, otherwise the
/// default config-dir file if present, otherwise the built-in set.
pub fn load_registry() -> ProjectRegistry {
    if let Some(path) = env_value(ENV_PROJECTS).map(PathBuf::from) {
        return match ProjectRegistry::from_file(&path) {
            Ok(registry) => registry,
            Err(err) => {
                tracing::warn!(error = %err, "falling back to built-in project registry");
                ProjectRegistry::builtin()
            }
        };
    }
    if let Some(path) = default_registry_path() {
        if path.exists() {
            match ProjectRegistry::from_file(&path) {
                Ok(registry) => return registry,
                Err(err) => {
                    tracing::warn!(error = %err, "falling back to built-in project registry");
                }
            }
        }
    }
    ProjectRegistry::builtin()
}

/// Returns the path to the default registry file
/// (`~/.config/beacon/projects.json`).
pub fn default_registry_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("beacon").join("projects.json"))
}

/// Scan configuration with `BEACON_SCAN_MARKER` and
/// `BEACON_SCAN_EXCLUDE` overrides applied.
pub fn scan_config_from_env() -> ScanConfig {
    scan_config_from(env_value(ENV_SCAN_MARKER), std::env::var(ENV_SCAN_EXCLUDE).ok())
}

fn scan_config_from(marker: Option<String>, exclude: Option<String>) -> ScanConfig {
    let mut config = ScanConfig::default();
    if let Some(marker) = marker {
        config.marker = marker.trim().to_string();
    }
    if let Some(exclude) = exclude {
        config.exclude_patterns = exclude
            .split(',')
            .map(str::trim)
            .filter(|pattern| !pattern.is_empty())
            .map(str::to_string)
            .collect();
    }
    config
}
