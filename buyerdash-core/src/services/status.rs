//! Status service - stored days and per-day campaign summaries

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{CampaignRecord, CampaignView, Catalog};
use crate::ports::{CampaignStore, DaySummary};

/// Status service for the campaign store
pub struct StatusService {
    repository: Arc<dyn CampaignStore>,
    catalog: Catalog,
}

impl StatusService {
    pub fn new(repository: Arc<dyn CampaignStore>, catalog: Catalog) -> Self {
        Self { repository, catalog }
    }

    /// Get overall status summary
    pub fn get_status(&self) -> Result<StatusSummary> {
        let total_campaigns = self.repository.count()?;
        let days = self.repository.list_days()?;

        let date_range = DateRange {
            earliest: days.first().map(|d| d.day),
            latest: days.last().map(|d| d.day),
        };

        Ok(StatusSummary {
            total_campaigns,
            total_days: days.len(),
            days,
            date_range,
        })
    }

    /// Campaigns of one day with display names and totals
    pub fn get_day(&self, day: NaiveDate) -> Result<DayDetail> {
        let records = self.repository.campaigns_for_day(day)?;
        let totals = DayTotals::from_records(&records);

        Ok(DayDetail {
            day,
            campaigns: records.iter().map(|r| self.catalog.enrich(r)).collect(),
            totals,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub total_campaigns: i64,
    pub total_days: usize,
    pub days: Vec<DaySummary>,
    pub date_range: DateRange,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDetail {
    pub day: NaiveDate,
    pub campaigns: Vec<CampaignView>,
    pub totals: DayTotals,
}

/// Summed money columns of a day; ROI is recomputed from the sums
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayTotals {
    pub spend: f64,
    pub revenue: f64,
    pub profit: f64,
    pub roi: f64,
}

impl DayTotals {
    pub fn from_records(records: &[CampaignRecord]) -> Self {
        let spend: f64 = records.iter().map(|r| r.spend).sum();
        let revenue: f64 = records.iter().map(|r| r.revenue).sum();
        let profit = revenue - spend;

        Self {
            spend,
            revenue,
            profit,
            roi: CampaignRecord::computed_roi(spend, profit),
        }
    }
}
