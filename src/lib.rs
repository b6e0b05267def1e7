//! scrapemaster - longitudinal warehouse for recurring web-site crawl snapshots.
//!
//! Each crawl run produces an immutable per-run SQLite snapshot describing
//! pages, links and redirects of the site. This crate migrates snapshots of
//! any supported schema version to the current one, computes key figures and
//! dimensional breakdowns, and folds them into a single append-only master
//! warehouse used for trend reporting.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod migrations;
pub mod pipeline;
pub mod snapshot;
pub mod warehouse;

pub use error::{Error, IngestOutcome, Result};
