//! Read access to one per-run snapshot database.
//!
//! A snapshot is produced by the crawler, immutable once written, and only
//! ever read here. Migration works on a transient copy; the source file is
//! never touched.

pub mod version;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rusqlite::{Connection, OpenFlags, OptionalExtension};

use crate::error::{Error, Result};

/// Timestamp format of a crawl run: `yymmdd-hhmm`. Lexicographic order over
/// these strings equals chronological order, which the warehouse relies on.
pub const TIMESTAMP_FORMAT: &str = "%y%m%d-%H%M";

/// A per-run snapshot database on disk.
#[derive(Debug)]
pub struct SnapshotDb {
    db_path: PathBuf,
}

impl SnapshotDb {
    /// Open an existing snapshot. Fails when the file is missing or carries
    /// no valid run timestamp.
    pub fn open(db_path: &Path) -> Result<Self> {
        if !db_path.is_file() {
            return Err(Error::Snapshot {
                path: db_path.to_path_buf(),
                reason: "no such file".into(),
            });
        }
        let snapshot = Self {
            db_path: db_path.to_path_buf(),
        };
        snapshot.timestamp()?;
        Ok(snapshot)
    }

    /// Read-only connection to the snapshot.
    pub fn connect(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// The run timestamp from the parameters table, validated against the
    /// `yymmdd-hhmm` format.
    pub fn timestamp(&self) -> Result<String> {
        let conn = self.connect()?;
        let ts = parameter(&conn, "timestamp")?.ok_or_else(|| Error::Snapshot {
            path: self.db_path.clone(),
            reason: "parameters table has no timestamp".into(),
        })?;
        if NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_err() {
            return Err(Error::Snapshot {
                path: self.db_path.clone(),
                reason: format!("malformed timestamp '{ts}'"),
            });
        }
        Ok(ts)
    }

    /// Total number of pages in the snapshot.
    pub fn page_count(&self) -> Result<i64> {
        let conn = self.connect()?;
        let count = conn.query_row("SELECT count(*) FROM pages", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Read a single value from the snapshot's parameters table. Historical
/// snapshots may lack the table entirely, which reads as absent.
pub fn parameter(conn: &Connection, name: &str) -> Result<Option<String>> {
    if !version::table_exists(conn, "parameters")? {
        return Ok(None);
    }
    let value = conn
        .query_row(
            "SELECT value FROM parameters WHERE name = ?1",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// Write a parameter value, creating the parameters table when absent.
/// Used on transient migration copies only.
pub fn set_parameter(conn: &Connection, name: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS parameters (
            name  TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL)",
        [],
    )?;
    conn.execute(
        "INSERT OR REPLACE INTO parameters (name, value) VALUES (?1, ?2)",
        [name, value],
    )?;
    Ok(())
}
