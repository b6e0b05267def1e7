//! v6 -> v7: normalize the redirect type vocabulary.
//!
//! Early crawler releases wrote several spellings per redirect kind, and
//! 301/302 responses were lumped together as 'server'. Every metric
//! definition assumes the canonical vocabulary: 'alias', 'redir 301',
//! 'redir 302', 'client refresh'.

use rusqlite::Connection;

use super::MigrationStep;

pub fn step() -> MigrationStep {
    MigrationStep {
        to: 7,
        name: "normalize redirs.type vocabulary",
        apply,
    }
}

fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE redirs SET type = CASE type
            WHEN 'alias url'           THEN 'alias'
            WHEN 'alias_url'           THEN 'alias'
            WHEN 'server'              THEN 'redir 301'
            WHEN '301'                 THEN 'redir 301'
            WHEN '302'                 THEN 'redir 302'
            WHEN 'client'              THEN 'client refresh'
            WHEN 'client-side refresh' THEN 'client refresh'
            ELSE type
         END",
        [],
    )?;
    Ok(())
}
