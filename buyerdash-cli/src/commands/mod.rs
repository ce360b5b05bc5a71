//! CLI command implementations

pub mod export;
pub mod import;
pub mod logs;
pub mod remove;
pub mod show;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use buyerdash_core::{BuyerdashContext, EntryPoint, LogEvent, LoggingService};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the data directory from BUYERDASH_DIR or default to ~/.buyerdash
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("BUYERDASH_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".buyerdash"))
}

/// Get or create buyerdash context
pub fn get_context() -> Result<BuyerdashContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    BuyerdashContext::new(&data_dir).context("Failed to initialize buyerdash context")
}
