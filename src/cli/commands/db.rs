//! Warehouse maintenance commands.

use console::style;

use crate::config::Settings;
use crate::warehouse::MasterWarehouse;

pub fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!("{} Master warehouse", style("→").cyan());
    println!("  Database: {}", settings.master_db.display());

    let warehouse = MasterWarehouse::open(&settings.master_db)?;
    let timestamps = warehouse.timestamps()?;

    match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) => {
            println!("  Ingested runs: {} ({} .. {})", timestamps.len(), first, last);
        }
        _ => println!("  Ingested runs: {}", style("none").yellow()),
    }
    println!("  Descriptions: {}", warehouse.descriptions()?.len());
    Ok(())
}

pub fn cmd_delete(settings: &Settings, timestamp: &str) -> anyhow::Result<()> {
    let warehouse = MasterWarehouse::open(&settings.master_db)?;
    if warehouse.delete_timestamp(timestamp)? {
        println!(
            "{} {} removed; re-ingest to correct its figures",
            style("✓").green(),
            timestamp
        );
    } else {
        println!("{} {} was not in the warehouse", style("·").dim(), timestamp);
    }
    Ok(())
}
