//! The master warehouse: the single long-lived store accumulating key
//! figures and dimensional breakdowns across all ingested crawl runs.
//!
//! Split into submodules:
//! - `schema`: table and view initialization
//! - `ingest`: the idempotent per-timestamp transactional write
//! - `descriptions`: human-readable metric labels, operator-maintained
//! - `history`: trend compilation and axis breakdowns

mod descriptions;
mod history;
mod ingest;
mod schema;

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::error::Result;

pub use history::{Axis, Figure, History, HistoryEntry, HistoryFilter};

/// SQLite-backed master warehouse. History is append-only: a timestamp's
/// rows are written exactly once and never updated.
pub struct MasterWarehouse {
    db_path: PathBuf,
}

impl MasterWarehouse {
    /// Open (and initialize if needed) the warehouse at the given path.
    pub fn open(db_path: &Path) -> Result<Self> {
        let warehouse = Self {
            db_path: db_path.to_path_buf(),
        };
        warehouse.init_schema()?;
        Ok(warehouse)
    }

    pub(crate) fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }

    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// All ingested timestamps, ascending.
    pub fn timestamps(&self) -> Result<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT timestamp FROM scranges ORDER BY timestamp")?;
        let timestamps = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(timestamps)
    }
}
