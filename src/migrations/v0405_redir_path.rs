//! v4 -> v5: the redirect target column is renamed from `resp_path` to
//! `redir_path`, the name every later query assumes.

use rusqlite::Connection;

use super::MigrationStep;
use crate::snapshot::version::has_column;

pub fn step() -> MigrationStep {
    MigrationStep {
        to: 5,
        name: "rename redirs.resp_path to redir_path",
        apply,
    }
}

fn apply(conn: &Connection) -> rusqlite::Result<()> {
    if has_column(conn, "redirs", "resp_path")? {
        conn.execute("ALTER TABLE redirs RENAME COLUMN resp_path TO redir_path", [])?;
    }
    Ok(())
}
