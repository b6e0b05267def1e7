//! Shared snapshot fixtures for the integration tests.

#![allow(dead_code)]

use std::path::Path;

use rusqlite::{params, Connection};

/// Create a snapshot at the current schema version (v8).
pub fn create_current_snapshot(path: &Path, timestamp: &str) -> Connection {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE parameters (
            name        TEXT PRIMARY KEY NOT NULL,
            value       TEXT NOT NULL);

        CREATE TABLE pages (
            page_id     INTEGER PRIMARY KEY AUTOINCREMENT,
            path        TEXT NOT NULL UNIQUE,
            language    TEXT,
            business    TEXT,
            category    TEXT,
            pagetype    TEXT,
            classes     TEXT,
            title       TEXT,
            description TEXT,
            num_h1s     INTEGER,
            first_h1    TEXT,
            ed_text     TEXT,
            aut_text    TEXT);

        CREATE TABLE links (
            page_path   TEXT,
            link_path   TEXT,
            text        TEXT);

        CREATE TABLE redirs (
            req_path    TEXT UNIQUE,
            redir_path  TEXT,
            type        TEXT);
    "#,
    )
    .unwrap();
    conn.execute(
        "INSERT INTO parameters (name, value) VALUES ('timestamp', ?1), ('db_version', '8')",
        [timestamp],
    )
    .unwrap();
    conn
}

/// Create a snapshot at schema v4: redirect target still named `resp_path`,
/// no description column, combined `text` column, legacy redirect type
/// vocabulary, meta descriptions in a `page_meta` side table.
pub fn create_v4_snapshot(path: &Path, timestamp: &str) -> Connection {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE parameters (
            name        TEXT PRIMARY KEY NOT NULL,
            value       TEXT NOT NULL);

        CREATE TABLE pages (
            page_id     INTEGER PRIMARY KEY AUTOINCREMENT,
            path        TEXT NOT NULL UNIQUE,
            language    TEXT,
            business    TEXT,
            category    TEXT,
            pagetype    TEXT,
            classes     TEXT,
            title       TEXT,
            num_h1s     INTEGER,
            first_h1    TEXT,
            text        TEXT);

        CREATE TABLE page_meta (
            page_id     INTEGER PRIMARY KEY,
            description TEXT);

        CREATE TABLE links (
            page_path   TEXT,
            link_path   TEXT,
            text        TEXT);

        CREATE TABLE redirs (
            req_path    TEXT UNIQUE,
            resp_path   TEXT,
            type        TEXT);
    "#,
    )
    .unwrap();
    conn.execute(
        "INSERT INTO parameters (name, value) VALUES ('timestamp', ?1), ('db_version', '4')",
        [timestamp],
    )
    .unwrap();
    conn
}

pub struct PageRow<'a> {
    pub path: &'a str,
    pub language: &'a str,
    pub business: &'a str,
    pub category: &'a str,
    pub pagetype: &'a str,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub num_h1s: i64,
}

impl Default for PageRow<'_> {
    fn default() -> Self {
        Self {
            path: "/en/page",
            language: "en",
            business: "belastingen",
            category: "dv",
            pagetype: "bld-page",
            title: Some("A page"),
            description: Some("About a page"),
            num_h1s: 1,
        }
    }
}

/// Insert a page into a current-version snapshot.
pub fn insert_page(conn: &Connection, page: &PageRow) {
    conn.execute(
        "INSERT INTO pages
             (path, language, business, category, pagetype, classes, title,
              description, num_h1s, first_h1, ed_text, aut_text)
         VALUES (?1, ?2, ?3, ?4, ?5, '', ?6, ?7, ?8, '', '', '')",
        params![
            page.path,
            page.language,
            page.business,
            page.category,
            page.pagetype,
            page.title,
            page.description,
            page.num_h1s,
        ],
    )
    .unwrap();
}

pub fn insert_redir(conn: &Connection, req_path: &str, redir_path: &str, redir_type: &str) {
    conn.execute(
        "INSERT INTO redirs (req_path, redir_path, type) VALUES (?1, ?2, ?3)",
        params![req_path, redir_path, redir_type],
    )
    .unwrap();
}

pub fn insert_link(conn: &Connection, page_path: &str, link_path: &str) {
    conn.execute(
        "INSERT INTO links (page_path, link_path, text) VALUES (?1, ?2, 'read more')",
        params![page_path, link_path],
    )
    .unwrap();
}
