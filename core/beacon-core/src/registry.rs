//! Project registry: the ordered set of projects the service knows about.
//!
//! The registry is built once at startup (from a JSON file or the built-in
//! defaults) and passed into the pipeline as an immutable value. Order
//! matters: resolution tie-breaks and the health map both follow it.

use crate::error::{BeaconError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One registered project: identifier, human-readable name, and the
/// filesystem prefix its sessions run under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "path")]
    pub root_path: String,
}

/// Ordered, immutable collection of [`ProjectRecord`]s keyed by `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectRegistry {
    records: Vec<ProjectRecord>,
}

impl ProjectRegistry {
    /// Builds a registry from records, keeping the first record for any
    /// duplicated id.
    pub fn new(records: Vec<ProjectRecord>) -> Self {
        let mut deduped: Vec<ProjectRecord> = Vec::with_capacity(records.len());
        for record in records {
            if deduped.iter().any(|existing| existing.id == record.id) {
                tracing::warn!(id = %record.id, "duplicate project id in registry, keeping first");
                continue;
            }
            deduped.push(record);
        }
        Self { records: deduped }
    }

    /// The built-in project set used when no registry file is configured.
    pub fn builtin() -> Self {
        let record = |id: &str, display_name: &str, root_path: &str| ProjectRecord {
            id: id.to_string(),
            display_name: display_name.to_string(),
            root_path: root_path.to_string(),
        };
        Self::new(vec![
            record(
                "fxscale-dashboard",
                "FXScale Dashboard",
                "/root/projects/fxscale-dashboard",
            ),
            record("closer-crm", "Closer CRM", "/root/projects/closer-crm"),
            record(
                "trading-intelligence",
                "Trading Intelligence",
                "/root/projects/trading-intelligence",
            ),
            record(
                "telegram-monitor",
                "Telegram Monitoring",
                "/root/projects/telegram-monitor",
            ),
            record("lp-createur", "LP Createur", "/root/projects/lp-createur"),
            record(
                "analyseur-creatives",
                "Analyseur Creatives",
                "/root/projects/analyseur-creatives",
            ),
            record(
                "generateur-creas-sth",
                "Générateur Créas STH",
                "/root/projects/generateur-creas-sth",
            ),
            record(
                "spy-affiliation-trading",
                "Spy Affiliation Trading",
                "/root/projects/spy-affiliation-trading",
            ),
        ])
    }

    /// Loads a registry from a JSON file holding an array of
    /// `{id, name, path}` objects.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).map_err(|source| BeaconError::Io {
            context: format!("reading project registry {}", path.display()),
            source,
        })?;
        let records: Vec<ProjectRecord> =
            serde_json::from_str(&content).map_err(|err| BeaconError::RegistryMalformed {
                path: path.to_path_buf(),
                details: err.to_string(),
            })?;
        if records.is_empty() {
            return Err(BeaconError::RegistryMalformed {
                path: path.to_path_buf(),
                details: "registry file contains no projects".to_string(),
            });
        }
        Ok(Self::new(records))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: &str) -> Option<&ProjectRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Display name for a project id, falling back to the id itself for
    /// unregistered projects.
    pub fn display_name(&self, id: &str) -> String {
        self.get(id)
            .map(|record| record.display_name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
