//! v5 -> v6: pages gain a nullable `description` column.
//!
//! Crawlers of that era stored meta descriptions in a `page_meta` side
//! table; when present its values are backfilled and the table dropped.
//! Without it the column stays NULL, which the catalogue counts as a page
//! without description.

use rusqlite::Connection;

use super::MigrationStep;
use crate::snapshot::version::{has_column, table_exists};

pub fn step() -> MigrationStep {
    MigrationStep {
        to: 6,
        name: "add pages.description with page_meta backfill",
        apply,
    }
}

fn apply(conn: &Connection) -> rusqlite::Result<()> {
    if !has_column(conn, "pages", "description")? {
        conn.execute("ALTER TABLE pages ADD COLUMN description TEXT", [])?;
    }
    if table_exists(conn, "page_meta")? {
        conn.execute_batch(
            "UPDATE pages SET description = (
                 SELECT m.description FROM page_meta m
                 WHERE m.page_id = pages.page_id)
             WHERE description IS NULL;
             DROP TABLE page_meta;",
        )?;
    }
    Ok(())
}
