//! v7 -> v8: split the combined `pages.text` column into `ed_text`
//! (editorial) and `aut_text` (automated).
//!
//! Old snapshots cannot distinguish the two, so the full legacy value stays
//! editorial and the automated side starts empty. Nothing is lost.

use rusqlite::Connection;

use super::MigrationStep;
use crate::snapshot::version::has_column;

pub fn step() -> MigrationStep {
    MigrationStep {
        to: 8,
        name: "split pages.text into ed_text and aut_text",
        apply,
    }
}

fn apply(conn: &Connection) -> rusqlite::Result<()> {
    if !has_column(conn, "pages", "ed_text")? {
        conn.execute_batch(
            "ALTER TABLE pages ADD COLUMN ed_text TEXT;
             ALTER TABLE pages ADD COLUMN aut_text TEXT;",
        )?;
        conn.execute("UPDATE pages SET ed_text = text, aut_text = ''", [])?;
    }
    if has_column(conn, "pages", "text")? {
        conn.execute("ALTER TABLE pages DROP COLUMN text", [])?;
    }
    Ok(())
}
