//! The per-timestamp ingestion transaction.

use std::collections::BTreeMap;

use rusqlite::{params, TransactionBehavior};
use tracing::info;

use super::MasterWarehouse;
use crate::error::{IngestOutcome, Result};
use crate::extract::DimensionCount;

impl MasterWarehouse {
    /// Ingest one snapshot's figures.
    ///
    /// The `scranges` marker, the full key-figure set and the full dimension
    /// rows are written in a single transaction: a failure mid-write leaves
    /// no rows for the timestamp. A timestamp that is already present makes
    /// this a no-op, so re-running ingestion after a crash is always safe.
    pub fn ingest(
        &self,
        timestamp: &str,
        figures: &BTreeMap<String, i64>,
        dimensions: &[DimensionCount],
    ) -> Result<IngestOutcome> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let already: i64 = tx.query_row(
            "SELECT count(*) FROM scranges WHERE timestamp = ?1",
            [timestamp],
            |row| row.get(0),
        )?;
        if already > 0 {
            // Idempotency guard: nothing may be modified.
            return Ok(IngestOutcome::AlreadyIngested);
        }

        tx.execute("INSERT INTO scranges (timestamp) VALUES (?1)", [timestamp])?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO key_figures (timestamp, name, value) VALUES (?1, ?2, ?3)",
            )?;
            for (name, value) in figures {
                stmt.execute(params![timestamp, name, value])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO dimensions
                     (timestamp, language, business, category, pagetype, num_pages)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for dim in dimensions {
                stmt.execute(params![
                    timestamp,
                    dim.language,
                    dim.business,
                    dim.category,
                    dim.pagetype,
                    dim.num_pages,
                ])?;
            }
        }

        tx.commit()?;
        info!(
            timestamp,
            figures = figures.len(),
            dimensions = dimensions.len(),
            "snapshot ingested into master warehouse"
        );
        Ok(IngestOutcome::Ingested)
    }

    /// Whether a run has already been ingested.
    pub fn is_ingested(&self, timestamp: &str) -> Result<bool> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT count(*) FROM scranges WHERE timestamp = ?1",
            [timestamp],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Remove all rows for a timestamp. The warehouse is append-only in
    /// normal operation; this is the compensating path that precedes a
    /// corrective re-ingestion. Returns whether the timestamp existed.
    pub fn delete_timestamp(&self, timestamp: &str) -> Result<bool> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM key_figures WHERE timestamp = ?1", [timestamp])?;
        tx.execute("DELETE FROM dimensions WHERE timestamp = ?1", [timestamp])?;
        let removed = tx.execute("DELETE FROM scranges WHERE timestamp = ?1", [timestamp])?;
        tx.commit()?;
        Ok(removed > 0)
    }
}
