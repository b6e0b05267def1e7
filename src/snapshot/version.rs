//! Structural schema-version detection.
//!
//! The schema version of a snapshot is implied by the presence, absence and
//! shape of known tables and columns. A stored `db_version` parameter exists
//! in newer snapshots but historical ones lack it, so structure always
//! decides; a disagreeing stored value is only logged.

use rusqlite::Connection;
use tracing::warn;

use crate::error::{Error, Result};
use crate::snapshot::parameter;

/// A snapshot schema version. Versions form a strict chain; every step in
/// `crate::migrations` moves exactly one version forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SchemaVersion(pub u32);

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// The schema version all extraction queries are written against.
pub const CURRENT_VERSION: SchemaVersion = SchemaVersion(8);

/// Oldest version with a migration path to current.
pub const OLDEST_SUPPORTED: SchemaVersion = SchemaVersion(4);

/// Detect the schema version of a snapshot from its structure.
///
/// Returns `UnsupportedVersion` when the shape matches no known version.
pub fn detect(conn: &Connection) -> Result<SchemaVersion> {
    let detected = detect_structural(conn)?;

    if let Some(stored) = parameter(conn, "db_version")? {
        if stored != detected.0.to_string() {
            warn!(
                stored = %stored,
                detected = %detected,
                "stored db_version disagrees with snapshot structure; structure wins"
            );
        }
    }

    Ok(detected)
}

fn detect_structural(conn: &Connection) -> Result<SchemaVersion> {
    let unsupported = |found: &str| Error::UnsupportedVersion {
        found: found.to_string(),
        current: CURRENT_VERSION.0,
    };

    if !table_exists(conn, "pages")? || !table_exists(conn, "redirs")? {
        return Err(unsupported("unrecognized shape (pages/redirs missing)"));
    }

    let pages = table_columns(conn, "pages")?;
    let redirs = table_columns(conn, "redirs")?;

    // v4: redirect target column still carries its pre-rename name.
    if redirs.iter().any(|c| c == "resp_path") {
        return Ok(SchemaVersion(4));
    }
    if !redirs.iter().any(|c| c == "redir_path") {
        return Err(unsupported("unrecognized shape (redirs without target column)"));
    }

    // v5: pages table predates the description column.
    if !pages.iter().any(|c| c == "description") {
        return Ok(SchemaVersion(5));
    }

    // v6 and v7 share one table shape; only the redirect type vocabulary
    // differs, so it has to be inspected.
    if has_legacy_redir_types(conn)? {
        return Ok(SchemaVersion(6));
    }

    let has_combined_text = pages.iter().any(|c| c == "text");
    let has_split_text =
        pages.iter().any(|c| c == "ed_text") && pages.iter().any(|c| c == "aut_text");

    if has_combined_text && !has_split_text {
        return Ok(SchemaVersion(7));
    }
    if has_split_text {
        return Ok(SchemaVersion(8));
    }

    Err(unsupported("unrecognized shape (no page text columns)"))
}

/// Redirect type values used before the vocabulary was normalized in v7.
const LEGACY_REDIR_TYPES: &[&str] = &[
    "alias url",
    "alias_url",
    "server",
    "301",
    "302",
    "client",
    "client-side refresh",
];

fn has_legacy_redir_types(conn: &Connection) -> Result<bool> {
    let placeholders = LEGACY_REDIR_TYPES
        .iter()
        .map(|_| "?")
        .collect::<Vec<_>>()
        .join(", ");
    let count: i64 = conn.query_row(
        &format!("SELECT count(*) FROM redirs WHERE type IN ({placeholders})"),
        rusqlite::params_from_iter(LEGACY_REDIR_TYPES.iter()),
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// True when the table exists in the main database.
pub fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Column names of a table, in declaration order.
pub fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{table}\")"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

/// True when the table has the named column.
pub fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    Ok(table_columns(conn, table)?.iter().any(|c| c == column))
}
