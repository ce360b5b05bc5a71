//! Service layer - business logic orchestration
//!
//! Services coordinate the parser, the catalog and the campaign store. Each
//! service focuses on a specific use case.

mod export;
pub mod import;
pub mod logging;
pub mod migration;
mod status;

pub use export::ExportService;
pub use import::{ImportOptions, ImportReport, ImportService};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use status::{DateRange, DayDetail, DayTotals, StatusService, StatusSummary};
