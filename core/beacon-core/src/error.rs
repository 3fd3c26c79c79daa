//! Error types for beacon-core operations.

use std::path::PathBuf;

/// All errors that can occur in beacon-core operations.
///
/// Service handlers generally degrade instead of propagating these;
/// the rich type exists for startup paths and for callers that want
/// the detail.
#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    #[error("Project registry malformed: {path}: {details}")]
    RegistryMalformed { path: PathBuf, details: String },

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using BeaconError.
pub type Result<T> = std::result::Result<T, BeaconError>;
