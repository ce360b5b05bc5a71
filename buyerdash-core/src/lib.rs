//! Buyerdash Core - campaign report ingestion for media buyers
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: Core entities (CampaignRecord, Catalog, ...)
//! - **ingest**: Pure parser turning pasted spreadsheet text into records
//! - **ports**: Trait definitions for external dependencies (CampaignStore)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (DuckDB)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ingest;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use ports::CampaignStore;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{BuyerCode, CampaignRecord, CampaignView, Catalog, Site};
pub use ingest::{parse, EarningsColumn, LineError, ParseConfig, ParseOutcome, RejectReason};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Main context for Buyerdash operations
///
/// Holds the configuration, the campaign store and the services built on it.
pub struct BuyerdashContext {
    pub config: Config,
    pub catalog: Catalog,
    pub repository: Arc<DuckDbRepository>,
    pub import_service: ImportService,
    pub status_service: StatusService,
    pub export_service: ExportService,
}

impl BuyerdashContext {
    /// Open the data directory, creating the campaign database if needed
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let catalog = Catalog::with_overrides(&config.catalog);

        let repository = Arc::new(DuckDbRepository::new(&data_dir.join("campaigns.duckdb"))?);
        repository.ensure_schema()?;

        let store: Arc<dyn CampaignStore> = repository.clone();
        let import_service = ImportService::new(Arc::clone(&store), catalog.clone());
        let status_service = StatusService::new(Arc::clone(&store), catalog.clone());
        let export_service = ExportService::new(store, catalog.clone());

        Ok(Self {
            config,
            catalog,
            repository,
            import_service,
            status_service,
            export_service,
        })
    }
}
