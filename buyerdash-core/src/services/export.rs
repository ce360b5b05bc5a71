//! Export service - stored campaigns as CSV

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::domain::Catalog;
use crate::ports::CampaignStore;

const EXPORT_HEADERS: [&str; 15] = [
    "id",
    "date",
    "buyerCode",
    "buyer",
    "accountCode",
    "site",
    "seriesCode",
    "series",
    "spend",
    "revenue",
    "profit",
    "roi",
    "cpc",
    "ctr",
    "ecpm",
];

/// Writes enriched campaign rows as CSV
pub struct ExportService {
    repository: Arc<dyn CampaignStore>,
    catalog: Catalog,
}

impl ExportService {
    pub fn new(repository: Arc<dyn CampaignStore>, catalog: Catalog) -> Self {
        Self { repository, catalog }
    }

    /// Write one day, or every stored day when `day` is `None`
    ///
    /// Returns the number of rows written. The header row is always present.
    pub fn write_csv<W: Write>(&self, day: Option<NaiveDate>, writer: W) -> Result<usize> {
        let days = match day {
            Some(day) => vec![day],
            None => self
                .repository
                .list_days()?
                .into_iter()
                .map(|summary| summary.day)
                .collect(),
        };

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        wtr.write_record(EXPORT_HEADERS)?;

        let mut rows = 0;
        for day in days {
            let records = self
                .repository
                .campaigns_for_day(day)
                .with_context(|| format!("Failed to read campaigns for {}", day))?;
            for record in &records {
                wtr.serialize(self.catalog.enrich(record))?;
                rows += 1;
            }
        }

        wtr.flush()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::duckdb::DuckDbRepository;
    use crate::domain::{BuyerCode, CampaignRecord, CampaignStatus, Site};
    use tempfile::TempDir;

    fn record(id: &str, day: NaiveDate, series: &str) -> CampaignRecord {
        CampaignRecord {
            id: id.to_string(),
            date: day,
            buyer_code: BuyerCode::Wa,
            account_code: "CO1-01".to_string(),
            site: Site::Dor,
            series_code: series.to_string(),
            spend: 100.0,
            revenue: 150.0,
            profit: 50.0,
            roi: 50.0,
            cpc: 0.5,
            ctr: 2.0,
            ecpm: 5.0,
            status: CampaignStatus::Active,
        }
    }

    fn setup(temp_dir: &TempDir) -> ExportService {
        let repo = Arc::new(DuckDbRepository::new(&temp_dir.path().join("test.duckdb")).unwrap());
        repo.ensure_schema().unwrap();

        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        repo.save_day(d1, &[record("X-1", d1, "DWD")], "b").unwrap();
        repo.save_day(d2, &[record("X-2", d2, "ZZZ")], "b").unwrap();

        let store: Arc<dyn CampaignStore> = repo;
        ExportService::new(store, Catalog::default())
    }

    #[test]
    fn test_export_all_days() {
        let temp_dir = TempDir::new().unwrap();
        let service = setup(&temp_dir);

        let mut out = Vec::new();
        let rows = service.write_csv(None, &mut out).unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,date,buyerCode,buyer,"));
        assert!(lines[1].starts_with("X-1,2024-01-01,WA,Wilian Wegner,CO1-01,Site Principal (DOR),DWD,"));
        // Unknown series codes keep their code as display name
        assert!(lines[2].contains(",ZZZ,ZZZ,"));
    }

    #[test]
    fn test_export_single_day() {
        let temp_dir = TempDir::new().unwrap();
        let service = setup(&temp_dir);

        let mut out = Vec::new();
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(service.write_csv(Some(day), &mut out).unwrap(), 1);

        let empty_day = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let mut out = Vec::new();
        assert_eq!(service.write_csv(Some(empty_day), &mut out).unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
