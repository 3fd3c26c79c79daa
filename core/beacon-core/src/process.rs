//! Process table inspection: finding candidate assistant processes.

use sysinfo::{ProcessRefreshKind, System, UpdateKind};

/// One process observed in the OS process table. `cwd` and `start_time`
/// are best-effort: reading them can fail for short-lived or restricted
/// processes, and a missing value is data, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCandidate {
    pub pid: u32,
    pub command: String,
    pub cwd: Option<String>,
    pub start_time: Option<u64>,
}

/// Source of process-table snapshots. The production implementation
/// reads the live system; tests substitute fixed candidate lists.
pub trait ProcessAdapter: Send + Sync {
    fn processes(&self) -> Result<Vec<ProcessCandidate>, String>;
}

/// Reads the live process table through sysinfo.
#[derive(Debug, Clone, Default)]
pub struct SysinfoProcessAdapter;

impl ProcessAdapter for SysinfoProcessAdapter {
    fn processes(&self) -> Result<Vec<ProcessCandidate>, String> {
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessRefreshKind::new()
                .with_cmd(UpdateKind::Always)
                .with_cwd(UpdateKind::Always),
        );

        let mut candidates = Vec::new();
        for (pid, process) in sys.processes() {
            let cmd = process.cmd();
            let command = if cmd.is_empty() {
                process.name().to_string()
            } else {
                cmd.join(" ")
            };
            // sysinfo reports 0 when the start time could not be read
            let start_time = match process.start_time() {
                0 => None,
                seconds => Some(seconds),
            };
            candidates.push(ProcessCandidate {
                pid: pid.as_u32(),
                command,
                cwd: process.cwd().map(|path| path.to_string_lossy().into_owned()),
                start_time,
            });
        }
        Ok(candidates)
    }
}

pub const DEFAULT_MARKER: &str = "claude";
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["grep", "/api/ia-usage"];

/// Which processes count as sessions: command must contain `marker`
/// (case-sensitive), must not contain any exclusion pattern, and must
/// not be the scanning process itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub marker: String,
    pub exclude_patterns: Vec<String>,
    pub self_pid: Option<u32>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|pattern| pattern.to_string())
                .collect(),
            self_pid: Some(std::process::id()),
        }
    }
}

impl ScanConfig {
    pub fn matches(&self, candidate: &ProcessCandidate) -> bool {
        if self.self_pid == Some(candidate.pid) {
            return false;
        }
        if !candidate.command.contains(&self.marker) {
            return false;
        }
        !self
            .exclude_patterns
            .iter()
            .any(|pattern| candidate.command.contains(pattern))
    }
}

/// Lists processes through the adapter and keeps those matching the scan
/// config, in pid order. An adapter failure is logged and reported as an
/// empty list so the snapshot endpoint stays up.
pub fn scan(adapter: &dyn ProcessAdapter, config: &ScanConfig) -> Vec<ProcessCandidate> {
    let candidates = match adapter.processes() {
        Ok(candidates) => candidates,
        Err(err) => {
            tracing::warn!(error = %err, "process listing failed, reporting no sessions");
            return Vec::new();
        }
    };
    let mut matched: Vec<ProcessCandidate> = candidates
        .into_iter()
        .filter(|candidate| config.matches(candidate))
        .collect();
    // The OS process table iterates in arbitrary order; pid order keeps
    // the session picked per project stable between scans.
    matched.sort_by_key(|candidate| candidate.pid);
    matched
}
