//! Ingestion tests: idempotency, all-or-nothing writes and the invariants
//! tying warehouse rows back to the snapshot they came from.

mod common;

use rusqlite::Connection;
use tempfile::TempDir;

use scrapemaster::config::Settings;
use scrapemaster::extract;
use scrapemaster::pipeline;
use scrapemaster::warehouse::MasterWarehouse;
use scrapemaster::{Error, IngestOutcome};

/// Every key-figure row in the warehouse, in a stable order.
fn dump_key_figures(warehouse: &MasterWarehouse) -> Vec<(String, String, i64)> {
    let conn = Connection::open(warehouse.database_path()).unwrap();
    let mut stmt = conn
        .prepare("SELECT timestamp, name, value FROM key_figures ORDER BY timestamp, name")
        .unwrap();
    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<rusqlite::Result<Vec<_>>>()
        .unwrap()
}

fn figure(warehouse: &MasterWarehouse, timestamp: &str, name: &str) -> i64 {
    let conn = Connection::open(warehouse.database_path()).unwrap();
    conn.query_row(
        "SELECT value FROM key_figures WHERE timestamp = ?1 AND name = ?2",
        [timestamp, name],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn ingest_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("scrape.db");
    let conn = common::create_current_snapshot(&snapshot, "201023-0313");
    common::insert_page(&conn, &common::PageRow::default());
    common::insert_redir(&conn, "/old", "/new", "redir 301");
    drop(conn);

    let warehouse = MasterWarehouse::open(&dir.path().join("master.db")).unwrap();

    let outcome = pipeline::ingest_snapshot(&snapshot, &warehouse).unwrap();
    assert_eq!(outcome, IngestOutcome::Ingested);
    let after_first = dump_key_figures(&warehouse);

    let outcome = pipeline::ingest_snapshot(&snapshot, &warehouse).unwrap();
    assert_eq!(outcome, IngestOutcome::AlreadyIngested);
    assert_eq!(dump_key_figures(&warehouse), after_first);
}

#[test]
fn already_ingested_timestamp_is_never_modified() {
    let dir = TempDir::new().unwrap();
    let warehouse = MasterWarehouse::open(&dir.path().join("master.db")).unwrap();

    let mut figures = std::collections::BTreeMap::new();
    figures.insert("pages".to_string(), 100_i64);
    warehouse.ingest("201023-0313", &figures, &[]).unwrap();

    // A second attempt with different numbers must leave the first intact.
    figures.insert("pages".to_string(), 999_i64);
    let outcome = warehouse.ingest("201023-0313", &figures, &[]).unwrap();
    assert_eq!(outcome, IngestOutcome::AlreadyIngested);
    assert_eq!(figure(&warehouse, "201023-0313", "pages"), 100);
}

#[test]
fn failed_extraction_leaves_no_rows() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("scrape.db");
    let conn = common::create_current_snapshot(&snapshot, "201023-0313");
    common::insert_page(&conn, &common::PageRow::default());
    // Sabotage: the link metrics have nothing to query.
    conn.execute_batch("DROP TABLE links").unwrap();
    drop(conn);

    let warehouse = MasterWarehouse::open(&dir.path().join("master.db")).unwrap();
    let err = pipeline::ingest_snapshot(&snapshot, &warehouse).unwrap_err();
    assert!(matches!(err, Error::Extraction { .. }), "{err}");

    assert!(warehouse.timestamps().unwrap().is_empty());
    assert!(dump_key_figures(&warehouse).is_empty());
}

#[test]
fn dimension_rows_sum_to_the_page_count() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("scrape.db");
    let conn = common::create_current_snapshot(&snapshot, "201023-0313");

    for (i, (language, pagetype)) in [
        ("en", "bld-page"),
        ("en", "bld-wrapper"),
        ("nl", "bld-page"),
        ("nl", "bld-page"),
        ("nl", "bld-dv"),
    ]
    .into_iter()
    .enumerate()
    {
        let path = format!("/p/{i}");
        common::insert_page(
            &conn,
            &common::PageRow {
                path: &path,
                language,
                pagetype,
                ..Default::default()
            },
        );
    }
    // A page with no language at all still lands in exactly one dimension row.
    conn.execute(
        "INSERT INTO pages (path, num_h1s) VALUES ('/orphan', 1)",
        [],
    )
    .unwrap();

    let dimensions = extract::dimensions(&conn).unwrap();
    let total: i64 = dimensions.iter().map(|d| d.num_pages).sum();
    assert_eq!(total, 6);
    drop(conn);

    let warehouse = MasterWarehouse::open(&dir.path().join("master.db")).unwrap();
    pipeline::ingest_snapshot(&snapshot, &warehouse).unwrap();

    let conn = Connection::open(warehouse.database_path()).unwrap();
    let stored_total: i64 = conn
        .query_row(
            "SELECT sum(num_pages) FROM dimensions WHERE timestamp = '201023-0313'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored_total, figure(&warehouse, "201023-0313", "pages"));
}

#[test]
fn example_crawl_yields_the_expected_figures() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("scrape.db");
    let conn = common::create_current_snapshot(&snapshot, "201023-0313");

    // 100 pages: 3 without an h1, 1 with two, the rest with exactly one.
    for i in 0..100 {
        let num_h1s = match i {
            0..=2 => 0,
            3 => 2,
            _ => 1,
        };
        let path = format!("/en/page-{i}");
        common::insert_page(
            &conn,
            &common::PageRow {
                path: &path,
                num_h1s,
                ..Default::default()
            },
        );
    }

    // 4 aliases, 2 cosmetic slash rewrites, 3 real moves, 1 temporary.
    common::insert_redir(&conn, "/alias1", "/en/page-0", "alias");
    common::insert_redir(&conn, "/alias2", "/en/page-0", "alias");
    common::insert_redir(&conn, "/alias3", "/en/page-1", "alias");
    common::insert_redir(&conn, "/alias4", "/en/page-2", "alias");
    common::insert_redir(&conn, "/a", "/a/", "redir 301");
    common::insert_redir(&conn, "/b/", "/b", "redir 301");
    common::insert_redir(&conn, "/moved1", "/en/page-5", "redir 301");
    common::insert_redir(&conn, "/moved2", "/en/page-6", "redir 301");
    common::insert_redir(&conn, "/moved3", "/en/page-7", "redir 301");
    common::insert_redir(&conn, "/tmp", "/en/page-8", "redir 302");
    drop(conn);

    let warehouse = MasterWarehouse::open(&dir.path().join("master.db")).unwrap();
    let outcome = pipeline::ingest_snapshot(&snapshot, &warehouse).unwrap();
    assert_eq!(outcome, IngestOutcome::Ingested);

    assert_eq!(figure(&warehouse, "201023-0313", "pages"), 100);
    assert_eq!(figure(&warehouse, "201023-0313", "pages_no_h1"), 3);
    assert_eq!(figure(&warehouse, "201023-0313", "pages_multi_h1"), 1);
    assert_eq!(
        figure(&warehouse, "201023-0313", "pages_multi_h1_bld-page"),
        1
    );
    assert_eq!(figure(&warehouse, "201023-0313", "redirs_alias"), 4);
    assert_eq!(figure(&warehouse, "201023-0313", "redirs_slash_rewrite"), 2);
    assert_eq!(figure(&warehouse, "201023-0313", "redirs_301_moved"), 3);
    assert_eq!(figure(&warehouse, "201023-0313", "redirs"), 6);
    assert_eq!(figure(&warehouse, "201023-0313", "redirs_301"), 5);
    assert_eq!(figure(&warehouse, "201023-0313", "redirs_302"), 1);
    assert_eq!(figure(&warehouse, "201023-0313", "url_aliases_2x"), 1);

    let before = dump_key_figures(&warehouse);
    pipeline::ingest_snapshot(&snapshot, &warehouse).unwrap();
    assert_eq!(dump_key_figures(&warehouse), before);
}

#[test]
fn delete_timestamp_enables_corrective_reingestion() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("scrape.db");
    let conn = common::create_current_snapshot(&snapshot, "201023-0313");
    common::insert_page(&conn, &common::PageRow::default());
    drop(conn);

    let warehouse = MasterWarehouse::open(&dir.path().join("master.db")).unwrap();
    pipeline::ingest_snapshot(&snapshot, &warehouse).unwrap();
    assert!(warehouse.is_ingested("201023-0313").unwrap());

    assert!(warehouse.delete_timestamp("201023-0313").unwrap());
    assert!(!warehouse.is_ingested("201023-0313").unwrap());
    assert!(dump_key_figures(&warehouse).is_empty());
    // Deleting an absent timestamp is a reported no-op.
    assert!(!warehouse.delete_timestamp("201023-0313").unwrap());

    let outcome = pipeline::ingest_snapshot(&snapshot, &warehouse).unwrap();
    assert_eq!(outcome, IngestOutcome::Ingested);
}

#[test]
fn poisoned_snapshot_does_not_stop_the_run() {
    let dir = TempDir::new().unwrap();
    let scrapes_dir = dir.path().join("scrapes");
    for ts in ["200901-1000", "201001-1000", "201101-1000"] {
        let run_dir = scrapes_dir.join(ts);
        std::fs::create_dir_all(&run_dir).unwrap();
        let conn = common::create_current_snapshot(&run_dir.join("scrape.db"), ts);
        common::insert_page(&conn, &common::PageRow::default());
        if ts == "201001-1000" {
            conn.execute_batch("DROP TABLE links").unwrap();
        }
    }

    let settings = Settings {
        scrapes_dir,
        master_db: dir.path().join("master.db"),
        ..Settings::default()
    };

    let mut seen = 0;
    let summary = pipeline::run(&settings, |_| seen += 1).unwrap();
    assert_eq!(seen, 3);
    assert_eq!(summary.ingested, ["200901-1000", "201101-1000"]);
    assert_eq!(summary.failed.len(), 1);
    assert!(summary.failed[0]
        .snapshot
        .ends_with("201001-1000/scrape.db"));

    let warehouse = MasterWarehouse::open(&settings.master_db).unwrap();
    assert_eq!(
        warehouse.timestamps().unwrap(),
        ["200901-1000", "201101-1000"]
    );

    // A re-run skips the committed runs and reports the poisoned one again.
    let summary = pipeline::run(&settings, |_| {}).unwrap();
    assert!(summary.ingested.is_empty());
    assert_eq!(summary.already_ingested, ["200901-1000", "201101-1000"]);
    assert_eq!(summary.failed.len(), 1);
}

#[test]
fn run_honors_the_configured_window() {
    let dir = TempDir::new().unwrap();
    let scrapes_dir = dir.path().join("scrapes");
    for ts in ["200901-1000", "201001-1000", "201101-1000"] {
        let run_dir = scrapes_dir.join(ts);
        std::fs::create_dir_all(&run_dir).unwrap();
        let conn = common::create_current_snapshot(&run_dir.join("scrape.db"), ts);
        common::insert_page(&conn, &common::PageRow::default());
    }

    let settings = Settings {
        scrapes_dir,
        master_db: dir.path().join("master.db"),
        min_timestamp: Some("200901-1000".to_string()),
        max_timestamp: Some("201101-1000".to_string()),
    };

    let summary = pipeline::run(&settings, |_| {}).unwrap();
    assert_eq!(summary.ingested, ["201001-1000"]);
    assert!(summary.failed.is_empty());
}

#[test]
fn snapshot_file_is_left_untouched_by_ingestion() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("scrape.db");
    let conn = common::create_current_snapshot(&snapshot, "201023-0313");
    common::insert_page(&conn, &common::PageRow::default());
    drop(conn);
    let before = std::fs::read(&snapshot).unwrap();

    let warehouse = MasterWarehouse::open(&dir.path().join("master.db")).unwrap();
    pipeline::ingest_snapshot(&snapshot, &warehouse).unwrap();

    assert_eq!(std::fs::read(&snapshot).unwrap(), before);
}
