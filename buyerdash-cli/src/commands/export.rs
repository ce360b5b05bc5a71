//! Export command - write stored campaigns as CSV

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::get_context;
use crate::output;

pub fn run(day: Option<NaiveDate>, output_path: Option<PathBuf>) -> Result<()> {
    let ctx = get_context()?;

    match output_path {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create export file: {:?}", path))?;
            let rows = ctx.export_service.write_csv(day, BufWriter::new(file))?;
            output::success(&format!("Exported {} campaigns to {}", rows, path.display()));
        }
        None => {
            let stdout = io::stdout();
            ctx.export_service.write_csv(day, stdout.lock())?;
        }
    }

    Ok(())
}
