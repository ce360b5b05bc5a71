//! Show command - campaigns stored for one day

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::Cell;

use super::get_context;
use crate::output;

pub fn run(day: NaiveDate, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let detail = ctx.status_service.get_day(day)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    if detail.campaigns.is_empty() {
        output::warning(&format!("No campaigns stored for {}", day));
        return Ok(());
    }

    println!("{}", format!("Campaigns for {}", day).bold());
    println!();

    let mut table = output::create_table();
    table.set_header(vec![
        "Campaign", "Buyer", "Site", "Series", "Spend", "Revenue", "Profit", "ROI", "CPC", "CTR", "eCPM",
    ]);

    for c in &detail.campaigns {
        let profit = if c.profit < 0.0 {
            output::format_money(c.profit).red().to_string()
        } else {
            output::format_money(c.profit)
        };

        table.add_row(vec![
            Cell::new(&c.id),
            Cell::new(&c.buyer),
            Cell::new(&c.site),
            Cell::new(&c.series),
            output::number_cell(output::format_money(c.spend)),
            output::number_cell(output::format_money(c.revenue)),
            output::number_cell(profit),
            output::number_cell(output::format_percent(c.roi)),
            output::number_cell(output::format_money(c.cpc)),
            output::number_cell(output::format_percent(c.ctr)),
            output::number_cell(output::format_money(c.ecpm)),
        ]);
    }

    println!("{}", table);
    println!();

    let totals = &detail.totals;
    println!(
        "  Spend: {}  Revenue: {}  Profit: {}  ROI: {}",
        output::format_money(totals.spend),
        output::format_money(totals.revenue),
        output::format_money(totals.profit),
        output::format_percent(totals.roi)
    );

    Ok(())
}
