//! Buyerdash CLI - campaign reports for media buyers in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use buyerdash_core::EarningsColumn;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{export, import, logs, remove, show, status};

/// Buyerdash - campaign reports for media buyers in your terminal
#[derive(Parser)]
#[command(name = "bd", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import campaigns from text copied out of a spreadsheet
    Import {
        /// Path to the pasted report (reads stdin when omitted)
        file: Option<PathBuf>,
        /// Date every campaign with this day (YYYY-MM-DD) instead of the identifier date
        #[arg(long)]
        reference_date: Option<NaiveDate>,
        /// How to read the earnings column: revenue or profit
        #[arg(long)]
        earnings_column: Option<EarningsColumn>,
        /// Drop the first non-empty line (spreadsheet header)
        #[arg(long)]
        skip_header: bool,
        /// Preview without importing
        #[arg(long)]
        preview: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show stored days and totals
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the campaigns stored for one day
    Show {
        /// Day to show (YYYY-MM-DD)
        #[arg(long)]
        day: NaiveDate,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export stored campaigns as CSV
    Export {
        /// Only this day (YYYY-MM-DD); all days when omitted
        #[arg(long)]
        day: Option<NaiveDate>,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Delete the campaigns stored for one day
    Remove {
        /// Day to delete (YYYY-MM-DD)
        #[arg(long)]
        day: NaiveDate,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Import { file, reference_date, earnings_column, skip_header, preview, json } => {
            import::run(file, reference_date, earnings_column, skip_header, preview, json)
        }
        Commands::Status { json } => status::run(json),
        Commands::Show { day, json } => show::run(day, json),
        Commands::Export { day, output } => export::run(day, output),
        Commands::Remove { day, force } => remove::run(day, force),
        Commands::Logs { command } => logs::run(command),
    }
}
