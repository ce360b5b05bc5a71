//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod campaign;
pub mod catalog;
pub mod result;

pub use campaign::{BuyerCode, CampaignRecord, CampaignStatus, Site, IDENTIFIER_DELIMITER};
pub use catalog::{Catalog, CatalogOverrides, CampaignView};
