//! # beacon-core
//!
//! Core library for Beacon, providing session detection and snapshot
//! assembly shared by the monitor and dashboard services.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Services wrap the
//!   pipeline in blocking tasks as needed.
//! - **Immutable inputs**: The project registry and scan config are
//!   built once at startup and passed by reference; each snapshot is an
//!   independent computation over them.
//! - **Graceful degradation**: Unreadable process metadata becomes
//!   missing fields, a failed scan becomes an empty session list. The
//!   reporting endpoint never fails because the host got weird.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use beacon_core::{capture, ProjectRegistry, ScanConfig, SysinfoProcessAdapter};
//!
//! let registry = ProjectRegistry::builtin();
//! let snapshot = capture(&SysinfoProcessAdapter, &ScanConfig::default(), &registry);
//! println!("{}", serde_json::to_string(&snapshot)?);
//! ```

// Public modules
pub mod config;
pub mod error;
pub mod process;
pub mod registry;
pub mod resolve;
pub mod session;
pub mod snapshot;

// Re-export commonly used items at crate root
pub use config::{env_present, env_value, load_registry, resolve_port, scan_config_from_env};
pub use error::{BeaconError, Result};
pub use process::{scan, ProcessAdapter, ProcessCandidate, ScanConfig, SysinfoProcessAdapter};
pub use registry::{ProjectRecord, ProjectRegistry};
pub use resolve::resolve_project;
pub use session::{build_sessions, format_uptime, Session, MODEL_NAME};
pub use snapshot::{aggregate, capture, degraded, HealthEntry, HealthMap, Snapshot, VPS_LABEL};
