//! Warehouse schema initialization.
//!
//! These tables are a stable contract: downstream report generators depend
//! on their shape, while everything else in this crate may change freely
//! behind the history compiler's query surface.

use super::MasterWarehouse;
use crate::error::Result;

impl MasterWarehouse {
    pub(crate) fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS scranges (
                timestamp   TEXT PRIMARY KEY NOT NULL
            );

            CREATE TABLE IF NOT EXISTS key_figures (
                timestamp   TEXT NOT NULL,
                name        TEXT NOT NULL,
                value       INTEGER NOT NULL,
                PRIMARY KEY (timestamp, name)
            );

            CREATE TABLE IF NOT EXISTS descriptions (
                name        TEXT PRIMARY KEY NOT NULL,
                label       TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS dimensions (
                timestamp   TEXT NOT NULL,
                language    TEXT NOT NULL,
                business    TEXT NOT NULL,
                category    TEXT NOT NULL,
                pagetype    TEXT NOT NULL,
                num_pages   INTEGER NOT NULL,
                PRIMARY KEY (timestamp, language, business, category, pagetype)
            );

            CREATE INDEX IF NOT EXISTS idx_key_figures_name
                ON key_figures(name);
            CREATE INDEX IF NOT EXISTS idx_dimensions_timestamp
                ON dimensions(timestamp);

            -- Key figures with their operator-maintained labels; the raw
            -- metric name stands in when no label has been loaded yet.
            CREATE VIEW IF NOT EXISTS labeled_figures AS
                SELECT kf.timestamp, kf.name, kf.value,
                       coalesce(d.label, kf.name) AS label
                FROM key_figures kf
                LEFT JOIN descriptions d ON d.name = kf.name;
        "#,
        )?;
        Ok(())
    }
}
