//! CLI parser and command dispatch.

mod db;
mod descriptions;
mod history;
mod ingest;
mod init;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::warehouse::Axis;

#[derive(Parser)]
#[command(name = "scrapemaster")]
#[command(about = "Master warehouse for recurring site-crawl analytics")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Scrapes directory (overrides config file)
    #[arg(long, global = true, env = "SCRAPEMASTER_SCRAPES_DIR")]
    scrapes_dir: Option<PathBuf>,

    /// Master warehouse database (overrides config file)
    #[arg(long, global = true, env = "SCRAPEMASTER_MASTER_DB")]
    master_db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the master warehouse database
    Init,

    /// Migrate, extract and ingest snapshots into the warehouse
    Ingest {
        /// Ingest a single snapshot database instead of scanning the
        /// scrapes directory
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compile key-figure history, ordered by timestamp ascending
    History {
        /// Restrict to these metric names (repeatable)
        #[arg(short, long = "metric")]
        metrics: Vec<String>,
        /// Inclusive lower timestamp bound (yymmdd-hhmm)
        #[arg(long)]
        from: Option<String>,
        /// Inclusive upper timestamp bound (yymmdd-hhmm)
        #[arg(long)]
        to: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Aggregate dimensional page counts over chosen axes
    Breakdown {
        /// Axes to break down by, in order
        #[arg(short, long = "axis", required = true)]
        axes: Vec<Axis>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage metric descriptions (operator-maintained labels)
    Descriptions {
        #[command(subcommand)]
        command: DescriptionCommands,
    },

    /// Warehouse maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand)]
enum DescriptionCommands {
    /// Set the label of one metric name
    Set { name: String, label: String },
    /// Import name,label lines from a file
    Import { file: PathBuf },
    /// List all descriptions
    List,
}

#[derive(Subcommand)]
enum DbCommands {
    /// Report warehouse status (ingested runs, row counts)
    Check,
    /// Remove one timestamp's rows for a corrective re-ingestion
    Delete { timestamp: String },
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = cli.scrapes_dir {
        settings.scrapes_dir = dir;
    }
    if let Some(db) = cli.master_db {
        settings.master_db = db;
    }

    match cli.command {
        Commands::Init => init::cmd_init(&settings),
        Commands::Ingest { snapshot, json } => ingest::cmd_ingest(&settings, snapshot, json),
        Commands::History {
            metrics,
            from,
            to,
            json,
        } => history::cmd_history(&settings, metrics, from, to, json),
        Commands::Breakdown { axes, json } => history::cmd_breakdown(&settings, &axes, json),
        Commands::Descriptions { command } => match command {
            DescriptionCommands::Set { name, label } => {
                descriptions::cmd_set(&settings, &name, &label)
            }
            DescriptionCommands::Import { file } => descriptions::cmd_import(&settings, &file),
            DescriptionCommands::List => descriptions::cmd_list(&settings),
        },
        Commands::Db { command } => match command {
            DbCommands::Check => db::cmd_check(&settings),
            DbCommands::Delete { timestamp } => db::cmd_delete(&settings, &timestamp),
        },
    }
}
