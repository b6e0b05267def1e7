//! Ingestion commands: single snapshot or a full directory run.

use std::path::PathBuf;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Settings;
use crate::error::IngestOutcome;
use crate::pipeline::{self, FailedSnapshot, RunSummary};
use crate::snapshot::SnapshotDb;
use crate::warehouse::MasterWarehouse;

pub fn cmd_ingest(
    settings: &Settings,
    snapshot: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let summary = match snapshot {
        Some(path) => ingest_one(settings, path)?,
        None => ingest_all(settings)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if summary.failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} snapshot(s) failed", summary.failed.len())
    }
}

fn ingest_one(settings: &Settings, path: PathBuf) -> anyhow::Result<RunSummary> {
    let warehouse = MasterWarehouse::open(&settings.master_db)?;
    let mut summary = RunSummary::default();
    let timestamp = SnapshotDb::open(&path).and_then(|s| s.timestamp());
    match timestamp.and_then(|ts| {
        pipeline::ingest_snapshot(&path, &warehouse).map(|outcome| (ts, outcome))
    }) {
        Ok((ts, IngestOutcome::Ingested)) => summary.ingested.push(ts),
        Ok((ts, IngestOutcome::AlreadyIngested)) => summary.already_ingested.push(ts),
        Err(e) => summary.failed.push(FailedSnapshot {
            snapshot: path,
            reason: e.to_string(),
        }),
    }
    Ok(summary)
}

fn ingest_all(settings: &Settings) -> anyhow::Result<RunSummary> {
    let total = pipeline::discover(settings)?.len();
    let bar = ProgressBar::new(total as u64).with_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("static progress template"),
    );

    let summary = pipeline::run(settings, |path| {
        if let Some(name) = path.parent().and_then(|d| d.file_name()) {
            bar.set_message(name.to_string_lossy().into_owned());
        }
        bar.inc(1);
    })?;
    bar.finish_and_clear();
    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    for ts in &summary.ingested {
        println!("{} {} ingested", style("✓").green(), ts);
    }
    for ts in &summary.already_ingested {
        println!("{} {} already ingested, skipped", style("·").dim(), ts);
    }
    for failed in &summary.failed {
        println!(
            "{} {} failed: {}",
            style("✗").red(),
            failed.snapshot.display(),
            failed.reason
        );
    }
    println!(
        "\n{} ingested, {} skipped, {} failed",
        summary.ingested.len(),
        summary.already_ingested.len(),
        summary.failed.len()
    );
}
