//! Import command - import campaigns from pasted spreadsheet text

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::Colorize;

use super::{get_context, get_logger, log_event};
use crate::output;
use buyerdash_core::services::ImportOptions;
use buyerdash_core::{EarningsColumn, LogEvent};

/// Rejected lines shown after an import
const MAX_REJECTED_SHOWN: usize = 10;

pub fn run(
    file: Option<PathBuf>,
    reference_date: Option<NaiveDate>,
    earnings_column: Option<EarningsColumn>,
    skip_header: bool,
    preview: bool,
    json: bool,
) -> Result<()> {
    // Get text from: file or stdin
    let text = if let Some(file_path) = &file {
        std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {:?}", file_path))?
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read campaigns from stdin")?;
        buffer
    } else {
        anyhow::bail!("No campaign text provided. Pass a file or pipe the report on stdin.");
    };

    let ctx = get_context()?;
    let logger = get_logger();
    log_event(&logger, LogEvent::new("import_started").with_command("import"));

    // CLI flags override settings.json
    let options = ImportOptions {
        earnings_column: earnings_column.unwrap_or(ctx.config.import.earnings_column),
        reference_date,
        skip_header: skip_header || ctx.config.import.skip_header,
        preview,
    };

    let report = match ctx.import_service.import_text(&text, &options) {
        Ok(report) => report,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("import_failed")
                    .with_command("import")
                    .with_error(e.to_string()),
            );
            return Err(e);
        }
    };

    let mut completed = LogEvent::new(if preview {
        "import_previewed"
    } else {
        "import_completed"
    })
    .with_command("import");
    if report.rejected > 0 {
        completed = completed.with_error_details(report.reject_summary());
    }
    log_event(&logger, completed);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if preview {
        output::warning("PREVIEW MODE - No changes applied");
        println!();

        if let Some(records) = &report.records {
            let mut table = output::create_table();
            table.set_header(vec!["Date", "Buyer", "Account", "Site", "Series", "Spend", "Revenue", "Profit", "ROI"]);

            for r in records.iter().take(10) {
                table.add_row(vec![
                    comfy_table::Cell::new(r.date),
                    comfy_table::Cell::new(&r.buyer),
                    comfy_table::Cell::new(&r.account_code),
                    comfy_table::Cell::new(&r.site),
                    comfy_table::Cell::new(&r.series),
                    output::number_cell(output::format_money(r.spend)),
                    output::number_cell(output::format_money(r.revenue)),
                    output::number_cell(output::format_money(r.profit)),
                    output::number_cell(output::format_percent(r.roi)),
                ]);
            }

            println!("{}", table);

            if records.len() > 10 {
                println!("... and {} more", records.len() - 10);
            }
            println!();
        }
    } else {
        output::success("Import complete");
        println!();
    }

    println!("  Lines read: {}", report.lines);
    println!("  Accepted: {}", report.accepted);
    if report.duplicates > 0 {
        println!("  Duplicates (last line kept): {}", report.duplicates);
    }
    println!("  New: {}", report.inserted);
    println!("  Updated: {}", report.updated);
    let days: Vec<String> = report.days.iter().map(|d| d.to_string()).collect();
    println!("  Days: {}", days.join(", "));

    if report.rejected == 0 {
        return Ok(());
    }

    println!();
    println!("{}", format!("Rejected: {}", report.rejected).red().bold());
    for (reason, count) in &report.reject_counts {
        println!("  {}: {}", reason, count);
    }

    println!();
    let mut table = output::create_table();
    table.set_header(vec!["Line", "Reason", "Text"]);
    for error in report.errors.iter().take(MAX_REJECTED_SHOWN) {
        table.add_row(vec![
            error.line_number.to_string(),
            error.reason.to_string(),
            output::truncate(&error.raw_line, 60),
        ]);
    }
    println!("{}", table);

    if report.errors.len() > MAX_REJECTED_SHOWN {
        println!("... and {} more", report.errors.len() - MAX_REJECTED_SHOWN);
    }

    Ok(())
}
