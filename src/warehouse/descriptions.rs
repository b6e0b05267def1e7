//! Metric descriptions: operator-maintained labels for key-figure names.
//!
//! Descriptions live outside the per-timestamp ingestion transaction; they
//! are upserted by name and referenced many-to-one from key figures.

use std::io::BufRead;

use rusqlite::params;

use super::MasterWarehouse;
use crate::error::Result;

impl MasterWarehouse {
    /// Insert or replace the label for a metric name.
    pub fn upsert_description(&self, name: &str, label: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO descriptions (name, label) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET label = excluded.label",
            params![name, label],
        )?;
        Ok(())
    }

    /// Import `name,label` lines (the hand-maintained descriptions file).
    /// Blank lines and `#` comments are skipped. Returns the number of
    /// labels loaded.
    pub fn import_descriptions<R: BufRead>(&self, reader: R) -> Result<usize> {
        let mut count = 0;
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((name, label)) = line.split_once(',') {
                self.upsert_description(name.trim(), label.trim())?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// All descriptions, ordered by metric name.
    pub fn descriptions(&self) -> Result<Vec<(String, String)>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT name, label FROM descriptions ORDER BY name")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
