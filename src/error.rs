//! Error taxonomy for the warehouse pipeline.
//!
//! Every per-snapshot failure is confined to that snapshot: the pipeline
//! reports it and keeps processing the remaining runs.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The detected snapshot schema has no migration path to the current
    /// version. Fatal for that snapshot only.
    #[error("no migration path from {found} to current schema v{current}")]
    UnsupportedVersion { found: String, current: u32 },

    /// A single migration step could not be applied. The transient copy is
    /// discarded, so no partially migrated snapshot is ever extracted.
    #[error("migration step to v{version} failed: {source}")]
    MigrationStep {
        version: u32,
        #[source]
        source: rusqlite::Error,
    },

    /// A catalogue metric could not be evaluated against the migrated
    /// snapshot. No partial key-figure set is written.
    #[error("metric '{metric}' could not be evaluated: {source}")]
    Extraction {
        metric: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Storage failure in the master warehouse. Safe to retry: ingestion is
    /// idempotent per timestamp.
    #[error("master warehouse: {0}")]
    Warehouse(#[from] rusqlite::Error),

    /// The snapshot database is unusable (missing file, missing parameters,
    /// malformed timestamp).
    #[error("snapshot {path}: {reason}")]
    Snapshot { path: PathBuf, reason: String },

    #[error("configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Outcome of an ingestion attempt. `AlreadyIngested` is not an error: it is
/// the recognized idempotent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Ingested,
    AlreadyIngested,
}
