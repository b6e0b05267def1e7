//! Metric description maintenance.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use console::style;

use crate::config::Settings;
use crate::warehouse::MasterWarehouse;

pub fn cmd_set(settings: &Settings, name: &str, label: &str) -> anyhow::Result<()> {
    let warehouse = MasterWarehouse::open(&settings.master_db)?;
    warehouse.upsert_description(name, label)?;
    println!("{} {} = {}", style("✓").green(), name, label);
    Ok(())
}

pub fn cmd_import(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let warehouse = MasterWarehouse::open(&settings.master_db)?;
    let reader = BufReader::new(File::open(file)?);
    let count = warehouse.import_descriptions(reader)?;
    println!(
        "{} {} description(s) imported from {}",
        style("✓").green(),
        count,
        file.display()
    );
    Ok(())
}

pub fn cmd_list(settings: &Settings) -> anyhow::Result<()> {
    let warehouse = MasterWarehouse::open(&settings.master_db)?;
    for (name, label) in warehouse.descriptions()? {
        println!("{name:<40} {label}");
    }
    Ok(())
}
