//! Remove command - delete the campaigns of one day

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use dialoguer::Confirm;

use super::{get_context, get_logger, log_event};
use buyerdash_core::LogEvent;

pub fn run(day: NaiveDate, force: bool) -> Result<()> {
    let ctx = get_context()?;

    let stored = ctx.status_service.get_status()?;
    let Some(summary) = stored.days.iter().find(|d| d.day == day) else {
        eprintln!("{}", format!("No campaigns stored for {}", day).red());
        return Ok(());
    };

    // Confirm removal unless --force
    if !force {
        println!(
            "\n{}",
            format!("This will delete {} campaigns imported for {}.", summary.campaigns, day).yellow()
        );
        println!("{}\n", "Re-import the day's report to restore them.".dimmed());

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let deleted = ctx.import_service.remove_day(day)?;
    log_event(&get_logger(), LogEvent::new("day_removed").with_command("remove"));
    println!("\n{} Removed {} campaigns for {}\n", "✓".green(), deleted, day);

    Ok(())
}
