//! Snapshot schema migrations.
//!
//! Snapshots written by older crawler releases are carried forward through a
//! strict version chain: each step moves exactly one version and assumes the
//! invariants established by the previous ones, so steps are never skipped.
//! Steps run against a transient copy of the snapshot inside their own
//! transaction and are idempotent, so a failed migration can be retried
//! without corrupting anything.

mod v0405_redir_path;
mod v0506_page_description;
mod v0607_redir_vocabulary;
mod v0708_split_text;

use rusqlite::Connection;
use tracing::info;

use crate::error::{Error, Result};
use crate::snapshot::set_parameter;
use crate::snapshot::version::{self, SchemaVersion, CURRENT_VERSION, OLDEST_SUPPORTED};

/// One step of the migration chain, from version `to - 1` to `to`.
pub struct MigrationStep {
    pub to: u32,
    pub name: &'static str,
    apply: fn(&Connection) -> rusqlite::Result<()>,
}

/// The full ordered chain, oldest step first.
pub fn registry() -> Vec<MigrationStep> {
    vec![
        v0405_redir_path::step(),
        v0506_page_description::step(),
        v0607_redir_vocabulary::step(),
        v0708_split_text::step(),
    ]
}

/// Migrate a writable snapshot copy from its detected version to current.
///
/// Returns the version the snapshot started at. The connection must point at
/// a transient copy; the original snapshot is immutable.
pub fn migrate_to_current(conn: &mut Connection) -> Result<SchemaVersion> {
    let detected = version::detect(conn)?;

    if detected < OLDEST_SUPPORTED || detected > CURRENT_VERSION {
        return Err(Error::UnsupportedVersion {
            found: detected.to_string(),
            current: CURRENT_VERSION.0,
        });
    }

    for step in registry() {
        if step.to <= detected.0 {
            continue;
        }
        let tx = conn
            .transaction()
            .map_err(|source| Error::MigrationStep {
                version: step.to,
                source,
            })?;
        (step.apply)(&tx).map_err(|source| Error::MigrationStep {
            version: step.to,
            source,
        })?;
        set_parameter(&tx, "db_version", &step.to.to_string()).map_err(|source| {
            Error::MigrationStep {
                version: step.to,
                source,
            }
        })?;
        tx.commit().map_err(|source| Error::MigrationStep {
            version: step.to,
            source,
        })?;
        info!(step = step.name, to = step.to, "applied migration step");
    }

    Ok(detected)
}
