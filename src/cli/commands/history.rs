//! History and breakdown commands.

use console::style;

use crate::config::Settings;
use crate::error::Result;
use crate::warehouse::{Axis, HistoryEntry, HistoryFilter, MasterWarehouse};

pub fn cmd_history(
    settings: &Settings,
    metrics: Vec<String>,
    from: Option<String>,
    to: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let warehouse = MasterWarehouse::open(&settings.master_db)?;
    let filter = HistoryFilter {
        names: (!metrics.is_empty()).then_some(metrics),
        from,
        to,
    };

    let entries = warehouse
        .history(&filter)?
        .collect::<Result<Vec<HistoryEntry>>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        println!("{}", style(&entry.timestamp).cyan().bold());
        for (name, figure) in &entry.figures {
            println!("  {:<40} {:>8}  {}", name, figure.value, figure.label);
        }
    }
    println!("\n{} run(s)", entries.len());
    Ok(())
}

pub fn cmd_breakdown(settings: &Settings, axes: &[Axis], json: bool) -> anyhow::Result<()> {
    let warehouse = MasterWarehouse::open(&settings.master_db)?;
    let breakdown = warehouse.breakdown(axes)?;

    if json {
        let rows: Vec<serde_json::Value> = breakdown
            .iter()
            .map(|(tuple, counts)| {
                serde_json::json!({ "axes": tuple, "pages": counts })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for (tuple, counts) in &breakdown {
        println!("{}", style(tuple.join(" / ")).cyan().bold());
        for (timestamp, count) in counts {
            println!("  {timestamp}  {count:>8}");
        }
    }
    Ok(())
}
