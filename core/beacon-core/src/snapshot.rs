//! Snapshot assembly: the top-level JSON document served to clients.

use crate::process::{scan, ProcessAdapter, ScanConfig};
use crate::registry::ProjectRegistry;
use crate::session::{build_sessions, Session, MODEL_NAME};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Host identity reported with every snapshot.
pub const VPS_LABEL: &str = "VPS Principal (46.224.228.65)";

/// Per-project health line: present for every registered project whether
/// or not a session was found. `session` serializes as JSON null when
/// absent, it is never omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthEntry {
    pub name: String,
    pub active: bool,
    pub session: Option<Session>,
}

/// Health entries keyed by project id. Serializes as a JSON object in
/// registry order, which serde_json's default map would not preserve.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HealthMap {
    entries: Vec<(String, HealthEntry)>,
}

impl HealthMap {
    /// One entry per registered project, marking the projects that have
    /// a matching session active.
    pub fn from_sessions(registry: &ProjectRegistry, sessions: &[Session]) -> Self {
        let entries = registry
            .iter()
            .map(|record| {
                let session = sessions
                    .iter()
                    .find(|session| session.project == record.id)
                    .cloned();
                let entry = HealthEntry {
                    name: record.display_name.clone(),
                    active: session.is_some(),
                    session,
                };
                (record.id.clone(), entry)
            })
            .collect();
        Self { entries }
    }

    /// All-inactive health, used for degraded snapshots.
    pub fn inactive(registry: &ProjectRegistry) -> Self {
        Self::from_sessions(registry, &[])
    }

    pub fn get(&self, id: &str) -> Option<&HealthEntry> {
        self.entries
            .iter()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(_, entry)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, HealthEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for HealthMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, entry) in &self.entries {
            map.serialize_entry(id, entry)?;
        }
        map.end()
    }
}

/// The complete usage report. Built fresh for every request; field order
/// is the wire order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub total_active: usize,
    pub model: String,
    pub sessions: Vec<Session>,
    pub health: HealthMap,
    pub timestamp: String,
    pub vps: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Assembles a snapshot from already-built sessions. `totalActive`
/// counts every session, including unregistered ones that get no health
/// entry.
pub fn aggregate(
    sessions: Vec<Session>,
    registry: &ProjectRegistry,
    now: DateTime<Utc>,
) -> Snapshot {
    let health = HealthMap::from_sessions(registry, &sessions);
    Snapshot {
        total_active: sessions.len(),
        model: MODEL_NAME.to_string(),
        sessions,
        health,
        timestamp: format_timestamp(now),
        vps: VPS_LABEL.to_string(),
        error: None,
    }
}

/// Snapshot reported when the real one could not be obtained: nothing
/// active, every project inactive, and the failure in `error`.
pub fn degraded(
    registry: &ProjectRegistry,
    now: DateTime<Utc>,
    error: impl Into<String>,
) -> Snapshot {
    Snapshot {
        total_active: 0,
        model: MODEL_NAME.to_string(),
        sessions: Vec::new(),
        health: HealthMap::inactive(registry),
        timestamp: format_timestamp(now),
        vps: VPS_LABEL.to_string(),
        error: Some(error.into()),
    }
}

/// Runs the full local pipeline once: scan, build sessions, aggregate.
/// One instant is captured and used throughout.
pub fn capture(
    adapter: &dyn ProcessAdapter,
    config: &ScanConfig,
    registry: &ProjectRegistry,
) -> Snapshot {
    let now = Utc::now();
    let candidates = scan(adapter, config);
    let sessions = build_sessions(&candidates, registry, now);
    aggregate(sessions, registry, now)
}

/// ISO-8601 UTC with millisecond precision and `Z` suffix, e.g.
/// `2026-08-22T10:15:30.123Z`.
fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
