//! Status command - show stored days and totals

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Campaign Data Status".bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["Campaigns", &status.total_campaigns.to_string()]);
    table.add_row(vec!["Days", &status.total_days.to_string()]);
    table.add_row(vec!["Database", &output::format_size(ctx.repository.get_db_size()?)]);

    println!("{}", table);
    println!();

    if let (Some(earliest), Some(latest)) = (&status.date_range.earliest, &status.date_range.latest) {
        println!("Date range: {} to {}", earliest, latest);
        println!();
    }

    if status.days.is_empty() {
        output::info("No campaigns imported yet. Try `bd import report.txt`.");
        return Ok(());
    }

    println!("{}", "Recent Days".bold());
    for summary in status.days.iter().rev().take(7) {
        println!("  • {}  {} campaigns", summary.day, summary.campaigns);
    }

    Ok(())
}
