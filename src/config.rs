//! Configuration for the warehouse pipeline.
//!
//! Settings come from a TOML file (`scrapemaster.toml` next to the working
//! directory, or an explicit `--config` path) with sensible defaults when no
//! file exists. CLI flags override file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default config file name, discovered in the working directory.
pub const CONFIG_FILE: &str = "scrapemaster.toml";

/// Name of the snapshot database file inside each scrape directory.
pub const SNAPSHOT_FILE: &str = "scrape.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding one subdirectory per crawl run.
    pub scrapes_dir: PathBuf,

    /// Path of the master warehouse database.
    pub master_db: PathBuf,

    /// Runs with a timestamp at or before this bound are not processed.
    pub min_timestamp: Option<String>,

    /// Runs with a timestamp at or after this bound are not processed.
    pub max_timestamp: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let scrapes_dir = PathBuf::from("scrapes");
        let master_db = scrapes_dir.join("scrape_master.db");
        Self {
            scrapes_dir,
            master_db,
            min_timestamp: None,
            max_timestamp: None,
        }
    }
}

impl Settings {
    /// Load settings from an explicit path, the discovered config file, or
    /// defaults when neither exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        p.display()
                    )));
                }
                Some(p.to_path_buf())
            }
            None => {
                let discovered = PathBuf::from(CONFIG_FILE);
                discovered.exists().then_some(discovered)
            }
        };

        match path {
            Some(p) => Self::from_file(&p),
            None => Ok(Self::default()),
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// True when the timestamp falls inside the configured processing window.
    /// Bounds are exclusive, matching the append-only ingestion windows used
    /// operationally. Timestamps are `yymmdd-hhmm`, so lexicographic order is
    /// chronological order.
    pub fn in_window(&self, timestamp: &str) -> bool {
        if let Some(min) = &self.min_timestamp {
            if timestamp <= min.as_str() {
                return false;
            }
        }
        if let Some(max) = &self.max_timestamp {
            if timestamp >= max.as_str() {
                return false;
            }
        }
        true
    }
}
