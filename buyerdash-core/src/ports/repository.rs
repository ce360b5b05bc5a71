//! Campaign store port - day-partitioned persistence abstraction

use std::collections::{BTreeMap, HashSet};

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::CampaignRecord;

/// Number of campaigns stored for one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub day: NaiveDate,
    pub campaigns: i64,
}

/// Persistence for campaign records, partitioned by day
///
/// A record is keyed by `(id, day)`; saving the same key again replaces it.
pub trait CampaignStore: Send + Sync {
    // === Writes ===

    /// Upsert the records of several day partitions as one unit
    ///
    /// Either every day is written or none is. Records whose date differs
    /// from their map key are a caller bug and are refused.
    fn save_days(&self, days: &BTreeMap<NaiveDate, Vec<CampaignRecord>>, batch_id: &str) -> Result<()>;

    /// Upsert every record of one day partition
    fn save_day(&self, day: NaiveDate, records: &[CampaignRecord], batch_id: &str) -> Result<()> {
        self.save_days(&BTreeMap::from([(day, records.to_vec())]), batch_id)
    }

    /// Remove a whole day partition, returning the number of deleted records
    fn delete_day(&self, day: NaiveDate) -> Result<usize>;

    // === Reads ===

    /// All campaigns stored for a day, ordered by id
    fn campaigns_for_day(&self, day: NaiveDate) -> Result<Vec<CampaignRecord>>;

    /// Ids already stored for a day
    fn existing_ids(&self, day: NaiveDate) -> Result<HashSet<String>>;

    /// Stored days with their record counts, oldest first
    fn list_days(&self) -> Result<Vec<DaySummary>>;

    /// Total number of stored records
    fn count(&self) -> Result<i64>;
}
