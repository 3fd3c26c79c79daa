//! Mapping a process to a project id.
//!
//! Resolution runs an ordered list of strategies and takes the first
//! answer. Working-directory evidence always beats command-line
//! evidence: the command-line fallback only applies when the working
//! directory could not be read at all, because commands routinely
//! mention paths the process is not actually running in.

use crate::process::ProcessCandidate;
use crate::registry::ProjectRegistry;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_PROJECTS_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/projects/([^/]+)").unwrap());

type Strategy = fn(&ProcessCandidate, &ProjectRegistry) -> Option<String>;

const STRATEGIES: &[Strategy] = &[cwd_prefix, projects_segment, command_substring];

/// Resolves a candidate to a project id, or `None` when no strategy has
/// an answer.
pub fn resolve_project(
    candidate: &ProcessCandidate,
    registry: &ProjectRegistry,
) -> Option<String> {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(candidate, registry))
}

/// First registered project whose root path is a prefix of the working
/// directory, in registry order.
fn cwd_prefix(candidate: &ProcessCandidate, registry: &ProjectRegistry) -> Option<String> {
    let cwd = candidate.cwd.as_deref()?;
    registry
        .iter()
        .find(|record| cwd.starts_with(&record.root_path))
        .map(|record| record.id.clone())
}

/// A `/projects/<name>` segment anywhere in the working directory names
/// an ad-hoc project, even when it is not registered.
fn projects_segment(candidate: &ProcessCandidate, _registry: &ProjectRegistry) -> Option<String> {
    let cwd = candidate.cwd.as_deref()?;
    RE_PROJECTS_SEGMENT
        .captures(cwd)
        .and_then(|captures| captures.get(1))
        .map(|segment| segment.as_str().to_string())
}

/// Command-line fallback, only when the working directory is unknown.
fn command_substring(candidate: &ProcessCandidate, registry: &ProjectRegistry) -> Option<String> {
    if candidate.cwd.is_some() {
        return None;
    }
    registry
        .iter()
        .find(|record| {
            candidate.command.contains(&record.root_path)
                || candidate.command.contains(&record.id)
        })
        .map(|record| record.id.clone())
}
