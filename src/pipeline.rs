//! The batch ingestion pipeline.
//!
//! Walks the scrapes directory, and for every snapshot in the configured
//! window: copies it aside, migrates the copy to the current schema,
//! extracts key figures and dimensions, and ingests them into the master
//! warehouse. Failures are confined to their snapshot; the run continues
//! and reports every skip with its reason.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Settings, SNAPSHOT_FILE};
use crate::error::{IngestOutcome, Result};
use crate::snapshot::SnapshotDb;
use crate::warehouse::MasterWarehouse;
use crate::{extract, migrations};

/// Summary of one pipeline run, serializable for `--json` output.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    /// Timestamps ingested in this run.
    pub ingested: Vec<String>,
    /// Timestamps already present; skipped as idempotent no-ops.
    pub already_ingested: Vec<String>,
    /// Snapshots that failed, with the failure reason.
    pub failed: Vec<FailedSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct FailedSnapshot {
    pub snapshot: PathBuf,
    pub reason: String,
}

/// Find all snapshot databases under the scrapes directory, sorted by
/// directory name (directories are named after the run timestamp).
pub fn discover(settings: &Settings) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(&settings.scrapes_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    Ok(dirs
        .into_iter()
        .map(|dir| dir.join(SNAPSHOT_FILE))
        .filter(|db| db.is_file())
        .collect())
}

/// Migrate, extract and ingest a single snapshot.
///
/// The snapshot file itself is never modified: all migration steps run on a
/// transient copy that is removed afterwards, success or not.
pub fn ingest_snapshot(db_path: &Path, warehouse: &MasterWarehouse) -> Result<IngestOutcome> {
    let snapshot = SnapshotDb::open(db_path)?;
    let timestamp = snapshot.timestamp()?;

    // Cheap pre-check; the ingestion transaction guards again.
    if warehouse.is_ingested(&timestamp)? {
        return Ok(IngestOutcome::AlreadyIngested);
    }

    let workdir = tempfile::tempdir()?;
    let copy_path = workdir.path().join(SNAPSHOT_FILE);
    std::fs::copy(db_path, &copy_path)?;

    let mut conn = Connection::open(&copy_path)?;
    let from = migrations::migrate_to_current(&mut conn)?;
    info!(timestamp, %from, "snapshot copy migrated to current schema");

    let figures = extract::key_figures(&conn)?;
    let dimensions = extract::dimensions(&conn)?;
    drop(conn);

    warehouse.ingest(&timestamp, &figures, &dimensions)
}

/// Run the full pipeline over every discovered snapshot in the configured
/// timestamp window.
///
/// `progress` is invoked once per discovered snapshot, before it is
/// processed, so callers can drive a progress display.
pub fn run(settings: &Settings, mut progress: impl FnMut(&Path)) -> Result<RunSummary> {
    let warehouse = MasterWarehouse::open(&settings.master_db)?;
    let mut summary = RunSummary::default();

    for db_path in discover(settings)? {
        progress(&db_path);
        let timestamp = match SnapshotDb::open(&db_path).and_then(|s| s.timestamp()) {
            Ok(ts) => ts,
            Err(e) => {
                warn!(snapshot = %db_path.display(), error = %e, "snapshot skipped");
                summary.failed.push(FailedSnapshot {
                    snapshot: db_path,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if !settings.in_window(&timestamp) {
            continue;
        }

        match ingest_snapshot(&db_path, &warehouse) {
            Ok(IngestOutcome::Ingested) => summary.ingested.push(timestamp),
            Ok(IngestOutcome::AlreadyIngested) => {
                summary.already_ingested.push(timestamp);
            }
            Err(e) => {
                warn!(timestamp, error = %e, "snapshot skipped");
                summary.failed.push(FailedSnapshot {
                    snapshot: db_path,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(summary)
}
