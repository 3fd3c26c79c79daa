//! Building the per-session wire records from scanned processes.

use crate::process::ProcessCandidate;
use crate::registry::ProjectRegistry;
use crate::resolve::resolve_project;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Model identity reported with every session.
pub const MODEL_NAME: &str = "claude-opus-4-6";

/// Project id reported for processes no strategy could place.
pub const UNKNOWN_PROJECT: &str = "unknown";

/// Commands are truncated to this many characters on the wire.
pub const COMMAND_PREVIEW_CHARS: usize = 120;

/// One active session as it appears in the snapshot JSON. Field order
/// is the wire order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub project: String,
    pub project_name: String,
    pub pid: u32,
    pub model: String,
    pub uptime_seconds: u64,
    pub uptime: String,
    pub active: bool,
    pub command: String,
}

/// Builds the session list for one snapshot: resolve each candidate,
/// collapse duplicates per project id (first discovered wins), keep
/// unresolved processes as distinct `unknown` sessions.
pub fn build_sessions(
    candidates: &[ProcessCandidate],
    registry: &ProjectRegistry,
    now: DateTime<Utc>,
) -> Vec<Session> {
    let mut sessions = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for candidate in candidates {
        let resolved = resolve_project(candidate, registry);
        let dedup_key = match &resolved {
            Some(id) => id.clone(),
            None => format!("unknown-{}", candidate.pid),
        };
        if !seen.insert(dedup_key) {
            continue;
        }

        let (project, project_name) = match resolved {
            Some(id) => {
                let name = registry.display_name(&id);
                (id, name)
            }
            None => (
                UNKNOWN_PROJECT.to_string(),
                format!("Process {}", candidate.pid),
            ),
        };
        let uptime_seconds = uptime_seconds(candidate.start_time, now);

        sessions.push(Session {
            project,
            project_name,
            pid: candidate.pid,
            model: MODEL_NAME.to_string(),
            uptime_seconds,
            uptime: format_uptime(uptime_seconds),
            active: true,
            command: truncate_command(&candidate.command),
        });
    }

    sessions
}

/// Whole seconds since the process started, clamped at zero. Unknown
/// start times report zero rather than failing the session.
fn uptime_seconds(start_time: Option<u64>, now: DateTime<Utc>) -> u64 {
    match start_time {
        Some(started) => (now.timestamp() - started as i64).max(0) as u64,
        None => 0,
    }
}

/// Renders seconds as `45s`, `2m 5s`, or `1h 2m 5s`.
pub fn format_uptime(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else {
        format!("{minutes}m {secs}s")
    }
}

fn truncate_command(command: &str) -> String {
    command.chars().take(COMMAND_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-08-22T10:00:00Z")
            .expect("parse")
            .with_timezone(&Utc)
    }

    fn candidate(pid: u32, command: &str, cwd: Option<&str>) -> ProcessCandidate {
        ProcessCandidate {
            pid,
            command: command.to_string(),
            cwd: cwd.map(|value| value.to_string()),
            start_time: None,
        }
    }

    #[test]
    fn format_uptime_renders_seconds_minutes_hours() {
        assert_eq!(format_uptime(0), "0s");
        assert_eq!(format_uptime(45), "45s");
        assert_eq!(format_uptime(59), "59s");
        assert_eq!(format_uptime(60), "1m 0s");
        assert_eq!(format_uptime(125), "2m 5s");
        assert_eq!(format_uptime(3600), "1h 0m 0s");
        assert_eq!(format_uptime(3725), "1h 2m 5s");
    }

    #[test]
    fn duplicate_project_keeps_first_candidate() {
        let registry = ProjectRegistry::builtin();
        let candidates = vec![
            candidate(10, "claude", Some("/root/projects/closer-crm")),
            candidate(11, "claude", Some("/root/projects/closer-crm/src")),
        ];
        let sessions = build_sessions(&candidates, &registry, test_now());
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].pid, 10);
        assert_eq!(sessions[0].project, "closer-crm");
        assert_eq!(sessions[0].project_name, "Closer CRM");
    }

    #[test]
    fn unresolved_processes_stay_distinct() {
        let registry = ProjectRegistry::builtin();
        let candidates = vec![
            candidate(10, "claude", Some("/tmp/a")),
            candidate(11, "claude", Some("/tmp/b")),
        ];
        let sessions = build_sessions(&candidates, &registry, test_now());
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].project, "unknown");
        assert_eq!(sessions[0].project_name, "Process 10");
        assert_eq!(sessions[1].project_name, "Process 11");
    }

    #[test]
    fn extracted_project_uses_raw_id_as_display_name() {
        let registry = ProjectRegistry::builtin();
        let candidates = vec![candidate(10, "claude", Some("/root/projects/mystery-app/src"))];
        let sessions = build_sessions(&candidates, &registry, test_now());
        assert_eq!(sessions[0].project, "mystery-app");
        assert_eq!(sessions[0].project_name, "mystery-app");
    }

    #[test]
    fn uptime_counts_from_start_time_and_clamps_at_zero() {
        let registry = ProjectRegistry::builtin();
        let now = test_now();
        let mut started = candidate(10, "claude", Some("/root/projects/closer-crm"));
        started.start_time = Some((now.timestamp() - 125) as u64);
        let mut future = candidate(11, "claude", Some("/root/projects/lp-createur"));
        future.start_time = Some((now.timestamp() + 30) as u64);
        let unknown = candidate(12, "claude", Some("/root/projects/telegram-monitor"));

        let sessions = build_sessions(&[started, future, unknown], &registry, now);
        assert_eq!(sessions[0].uptime_seconds, 125);
        assert_eq!(sessions[0].uptime, "2m 5s");
        assert_eq!(sessions[1].uptime_seconds, 0);
        assert_eq!(sessions[2].uptime_seconds, 0);
        assert_eq!(sessions[2].uptime, "0s");
    }

    #[test]
    fn command_is_truncated_to_preview_length() {
        let registry = ProjectRegistry::builtin();
        let long_command = format!("claude {}", "x".repeat(200));
        let candidates = vec![candidate(10, &long_command, Some("/root/projects/closer-crm"))];
        let sessions = build_sessions(&candidates, &registry, test_now());
        assert_eq!(sessions[0].command.chars().count(), 120);
        assert!(long_command.starts_with(&sessions[0].command));
    }

    #[test]
    fn command_truncation_is_character_based() {
        let registry = ProjectRegistry::builtin();
        let long_command = format!("claude {}", "é".repeat(200));
        let candidates = vec![candidate(10, &long_command, Some("/root/projects/closer-crm"))];
        let sessions = build_sessions(&candidates, &registry, test_now());
        assert_eq!(sessions[0].command.chars().count(), 120);
    }

    #[test]
    fn session_serializes_with_wire_field_names() {
        let registry = ProjectRegistry::builtin();
        let candidates = vec![candidate(10, "claude", Some("/root/projects/closer-crm"))];
        let sessions = build_sessions(&candidates, &registry, test_now());
        let value = serde_json::to_value(&sessions[0]).expect("serialize");
        let object = value.as_object().expect("object");
        assert!(object.contains_key("projectName"));
        assert!(object.contains_key("uptimeSeconds"));
        assert!(!object.contains_key("project_name"));
        assert_eq!(object["model"], MODEL_NAME);
        assert_eq!(object["active"], true);
    }
}
