//! The history compiler: trend series per metric and dimensional breakdowns.
//!
//! Report consumers read only through this surface; they never touch the
//! warehouse tables directly.

use std::collections::{BTreeMap, VecDeque};

use rusqlite::{params_from_iter, Connection};
use serde::Serialize;

use super::MasterWarehouse;
use crate::error::Result;

/// Filter for history compilation. Both filters are pushed into SQL, so
/// excluded timestamps and metrics are never scanned.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Restrict to this metric-name subset (all metrics when None).
    pub names: Option<Vec<String>>,
    /// Inclusive lower timestamp bound.
    pub from: Option<String>,
    /// Inclusive upper timestamp bound.
    pub to: Option<String>,
}

/// One key figure with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Figure {
    pub value: i64,
    pub label: String,
}

/// The complete figure set of one ingested run.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub figures: BTreeMap<String, Figure>,
}

/// Lazy sequence of history entries, ordered by timestamp ascending.
/// Restartable: compile a fresh one from the warehouse at any time.
pub struct History {
    conn: Connection,
    timestamps: VecDeque<String>,
    names: Option<Vec<String>>,
}

impl Iterator for History {
    type Item = Result<HistoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let timestamp = self.timestamps.pop_front()?;
        Some(load_entry(&self.conn, timestamp, self.names.as_deref()))
    }
}

fn load_entry(
    conn: &Connection,
    timestamp: String,
    names: Option<&[String]>,
) -> Result<HistoryEntry> {
    let mut sql = String::from(
        "SELECT name, value, label FROM labeled_figures WHERE timestamp = ?1",
    );
    let mut params: Vec<String> = vec![timestamp.clone()];
    if let Some(names) = names {
        let placeholders = (0..names.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(" AND name IN ({placeholders})"));
        params.extend(names.iter().cloned());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut figures = BTreeMap::new();
    let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
        Ok((
            row.get::<_, String>(0)?,
            Figure {
                value: row.get(1)?,
                label: row.get(2)?,
            },
        ))
    })?;
    for row in rows {
        let (name, figure) = row?;
        figures.insert(name, figure);
    }

    Ok(HistoryEntry { timestamp, figures })
}

/// A breakdown axis of the dimensions table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Axis {
    Language,
    Business,
    Category,
    Pagetype,
}

impl Axis {
    pub fn column(self) -> &'static str {
        match self {
            Axis::Language => "language",
            Axis::Business => "business",
            Axis::Category => "category",
            Axis::Pagetype => "pagetype",
        }
    }
}

impl MasterWarehouse {
    /// Compile the history of key figures, ordered by timestamp ascending.
    ///
    /// Every entry is a full snapshot-in-time view: figures joined with
    /// their descriptions, the raw metric name standing in for a missing
    /// label.
    pub fn history(&self, filter: &HistoryFilter) -> Result<History> {
        let conn = self.connect()?;

        let mut sql = String::from("SELECT timestamp FROM scranges WHERE 1=1");
        let mut params: Vec<String> = Vec::new();
        if let Some(from) = &filter.from {
            params.push(from.clone());
            sql.push_str(&format!(" AND timestamp >= ?{}", params.len()));
        }
        if let Some(to) = &filter.to {
            params.push(to.clone());
            sql.push_str(&format!(" AND timestamp <= ?{}", params.len()));
        }
        sql.push_str(" ORDER BY timestamp");

        let timestamps = {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(params.iter()), |row| row.get(0))?
                .collect::<rusqlite::Result<VecDeque<String>>>()?;
            rows
        };

        Ok(History {
            conn,
            timestamps,
            names: filter.names.clone(),
        })
    }

    /// Aggregate the dimensions table over the chosen axes: for every
    /// observed axis-value tuple, the page count per timestamp. No axes
    /// means nothing to group by: the result is empty.
    pub fn breakdown(
        &self,
        axes: &[Axis],
    ) -> Result<BTreeMap<Vec<String>, BTreeMap<String, i64>>> {
        if axes.is_empty() {
            return Ok(BTreeMap::new());
        }
        let conn = self.connect()?;

        let columns = axes
            .iter()
            .map(|a| a.column())
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {columns}, timestamp, sum(num_pages)
             FROM dimensions
             GROUP BY {columns}, timestamp
             ORDER BY {columns}, timestamp"
        );

        let mut stmt = conn.prepare(&sql)?;
        let num_axes = axes.len();
        let mut result: BTreeMap<Vec<String>, BTreeMap<String, i64>> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            let mut tuple = Vec::with_capacity(num_axes);
            for i in 0..num_axes {
                tuple.push(row.get::<_, String>(i)?);
            }
            let timestamp: String = row.get(num_axes)?;
            let count: i64 = row.get(num_axes + 1)?;
            Ok((tuple, timestamp, count))
        })?;
        for row in rows {
            let (tuple, timestamp, count) = row?;
            result.entry(tuple).or_default().insert(timestamp, count);
        }

        Ok(result)
    }
}
