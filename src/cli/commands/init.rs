//! Warehouse initialization command.

use console::style;

use crate::config::Settings;
use crate::warehouse::MasterWarehouse;

pub fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    if let Some(parent) = settings.master_db.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let warehouse = MasterWarehouse::open(&settings.master_db)?;
    println!(
        "{} Master warehouse ready at {}",
        style("✓").green(),
        warehouse.database_path().display()
    );
    println!("  Scrapes directory: {}", settings.scrapes_dir.display());
    Ok(())
}
