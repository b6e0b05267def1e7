//! Key-figure extraction.
//!
//! The catalogue is a fixed, data-driven list of named aggregate queries,
//! versioned together with the snapshot schema: adding a metric is a release
//! event. All queries run against a current-version snapshot, so metric
//! definitions stay stable across history even though raw snapshot shapes
//! vary release over release.

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::Serialize;

use crate::error::{Error, Result};

/// One catalogue entry.
///
/// A scalar metric yields a single named count. A group metric yields one
/// key figure per group value; its query returns `(name, count)` rows with
/// the name fully formed.
pub enum Metric {
    Scalar { name: &'static str, sql: &'static str },
    Group { id: &'static str, sql: &'static str },
}

/// The metric catalogue, evaluated in full for every ingested snapshot.
///
/// Slash rewrites are counted independently of the per-type redirect counts:
/// whether a cosmetic slash rewrite should reduce the "real redirect" count
/// is deliberately left to the report reader.
pub const CATALOGUE: &[Metric] = &[
    Metric::Scalar {
        name: "pages",
        sql: "SELECT count(*) FROM pages",
    },
    Metric::Group {
        id: "pages_lang",
        sql: "SELECT 'pages_lang_' || coalesce(language, ''), count(*)
              FROM pages GROUP BY coalesce(language, '')",
    },
    Metric::Group {
        id: "pages_buss",
        sql: "SELECT 'pages_buss_' || coalesce(business, ''), count(*)
              FROM pages GROUP BY coalesce(business, '')",
    },
    Metric::Group {
        id: "pages_cat",
        sql: "SELECT 'pages_cat_' || coalesce(category, ''), count(*)
              FROM pages GROUP BY coalesce(category, '')",
    },
    Metric::Group {
        id: "pages_type",
        sql: "SELECT 'pages_type_' || coalesce(pagetype, ''), count(*)
              FROM pages GROUP BY coalesce(pagetype, '')",
    },
    Metric::Scalar {
        name: "pages_no_title",
        sql: "SELECT count(*) FROM pages WHERE title IS NULL OR title = ''",
    },
    Metric::Scalar {
        name: "pages_dupl_title",
        sql: "SELECT coalesce(sum(c), 0) FROM
                  (SELECT count(*) AS c FROM pages GROUP BY title)
              WHERE c > 1",
    },
    Metric::Scalar {
        name: "pages_no_descr",
        sql: "SELECT count(*) FROM pages
              WHERE description IS NULL OR description = ''",
    },
    Metric::Scalar {
        name: "pages_long_descr",
        sql: "SELECT count(*) FROM pages WHERE length(description) > 160",
    },
    Metric::Scalar {
        name: "pages_no_h1",
        sql: "SELECT count(*) FROM pages WHERE num_h1s = 0",
    },
    Metric::Scalar {
        name: "pages_multi_h1",
        sql: "SELECT count(*) FROM pages WHERE num_h1s > 1",
    },
    // H1 hygiene per pagetype: where the multi-h1 pages sit.
    Metric::Group {
        id: "pages_multi_h1_type",
        sql: "SELECT 'pages_multi_h1_' || coalesce(pagetype, ''), count(*)
              FROM pages WHERE num_h1s > 1 GROUP BY coalesce(pagetype, '')",
    },
    // An alias is strictly no redirect.
    Metric::Scalar {
        name: "redirs",
        sql: "SELECT count(*) FROM redirs WHERE type != 'alias'",
    },
    Metric::Group {
        id: "redirs_per_type",
        sql: "SELECT 'redirs_' || replace(replace(type, 'redir ', ''), ' ', '_'), count(*)
              FROM redirs WHERE type != 'alias' GROUP BY type",
    },
    Metric::Scalar {
        name: "redirs_alias",
        sql: "SELECT count(*) FROM redirs WHERE type = 'alias'",
    },
    // Requested and resolved path differ only by a trailing slash.
    Metric::Scalar {
        name: "redirs_slash_rewrite",
        sql: "SELECT count(*) FROM redirs
              WHERE req_path || '/' = redir_path OR req_path = redir_path || '/'",
    },
    // Permanent redirects that actually move content, as opposed to the
    // cosmetic slash rewrites above.
    Metric::Scalar {
        name: "redirs_301_moved",
        sql: "SELECT count(*) FROM redirs
              WHERE type = 'redir 301'
                AND NOT (req_path || '/' = redir_path OR req_path = redir_path || '/')",
    },
    Metric::Group {
        id: "url_aliases",
        sql: "SELECT 'url_aliases_' || n || 'x', count(*)
              FROM (SELECT count(*) AS n FROM redirs
                    WHERE type = 'alias' GROUP BY redir_path)
              GROUP BY n",
    },
    // Editorial links whose destination resolves to no page and no redirect
    // in the same snapshot.
    Metric::Scalar {
        name: "links_broken",
        sql: "SELECT count(*) FROM links l
              WHERE NOT EXISTS (SELECT 1 FROM pages p WHERE p.path = l.link_path)
                AND NOT EXISTS (SELECT 1 FROM redirs r WHERE r.req_path = l.link_path)",
    },
    // Links into language-specific wrapper pages for bundled content.
    Metric::Scalar {
        name: "links_to_wrapper",
        sql: "SELECT count(*) FROM links l
              JOIN pages p ON p.path = l.link_path
              WHERE p.pagetype = 'bld-wrapper'",
    },
];

/// Page count for one observed dimension combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionCount {
    pub language: String,
    pub business: String,
    pub category: String,
    pub pagetype: String,
    pub num_pages: i64,
}

/// Evaluate the full catalogue against a current-version snapshot.
///
/// Fails on the first metric that cannot be evaluated; the caller writes
/// either the complete set or nothing.
pub fn key_figures(conn: &Connection) -> Result<BTreeMap<String, i64>> {
    let mut figures = BTreeMap::new();

    for metric in CATALOGUE {
        match metric {
            Metric::Scalar { name, sql } => {
                let value: i64 = conn
                    .query_row(sql, [], |row| row.get(0))
                    .map_err(|source| Error::Extraction {
                        metric: (*name).to_string(),
                        source,
                    })?;
                figures.insert((*name).to_string(), value);
            }
            Metric::Group { id, sql } => {
                let rows = (|| -> rusqlite::Result<Vec<(String, i64)>> {
                    let mut stmt = conn.prepare(sql)?;
                    let rows = stmt
                        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    Ok(rows)
                })()
                .map_err(|source| Error::Extraction {
                    metric: (*id).to_string(),
                    source,
                })?;
                for (name, value) in rows {
                    figures.insert(name, value);
                }
            }
        }
    }

    Ok(figures)
}

/// Page counts per observed (language, business, category, pagetype)
/// combination. NULL axis values map to the empty string, so the rows sum to
/// the snapshot's total page count.
pub fn dimensions(conn: &Connection) -> Result<Vec<DimensionCount>> {
    let sql = "SELECT coalesce(language, ''), coalesce(business, ''),
                      coalesce(category, ''), coalesce(pagetype, ''), count(*)
               FROM pages
               GROUP BY coalesce(language, ''), coalesce(business, ''),
                        coalesce(category, ''), coalesce(pagetype, '')";

    let rows = (|| -> rusqlite::Result<Vec<DimensionCount>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(DimensionCount {
                    language: row.get(0)?,
                    business: row.get(1)?,
                    category: row.get(2)?,
                    pagetype: row.get(3)?,
                    num_pages: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    })()
    .map_err(|source| Error::Extraction {
        metric: "dimensions".to_string(),
        source,
    })?;

    Ok(rows)
}
