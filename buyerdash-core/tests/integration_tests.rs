//! Integration tests for buyerdash-core services
//!
//! These tests run the whole path from pasted text to stored campaigns
//! against a real DuckDB file in a temporary data directory.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tempfile::TempDir;

use anyhow::{bail, Result};
use chrono::NaiveDate;

use buyerdash_core::adapters::duckdb::DuckDbRepository;
use buyerdash_core::domain::{BuyerCode, CampaignRecord, Catalog, Site};
use buyerdash_core::ports::{CampaignStore, DaySummary};
use buyerdash_core::services::{ImportOptions, ImportService};
use buyerdash_core::{BuyerdashContext, EarningsColumn, RejectReason};

// ============================================================================
// Test Helpers
// ============================================================================

const DAY_ONE: &str = "\
STATUS CAMPANHA ROI GASTO RECEITA LUCRO CPC CTR ECPM
CO1-01 SDM WA7 01012024 DWD 15,0% R$ 100,00 R$ 150,00 R$ 50,00 R$ 0,50 2,0% R$ 5,00
CO2-04 DOR BS3 01012024 LVM -20% 200 160 -40 0,30 1,5% 2,10

CO3-02 SDM US CS1 01012024 DWD 10% 1.000,00 1.100,00 100,00 0,25 3,1% 4,00
";

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn open_context(temp_dir: &TempDir) -> BuyerdashContext {
    BuyerdashContext::new(temp_dir.path()).expect("Failed to open context")
}

fn with_header() -> ImportOptions {
    ImportOptions {
        skip_header: true,
        ..Default::default()
    }
}

// ============================================================================
// Import end to end
// ============================================================================

#[test]
fn test_import_pasted_report() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(&temp_dir);

    let report = ctx.import_service.import_text(DAY_ONE, &with_header()).unwrap();
    assert_eq!(report.accepted, 3);
    assert_eq!(report.rejected, 0);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.days, vec![day(2024, 1, 1)]);

    let stored = ctx.repository.campaigns_for_day(day(2024, 1, 1)).unwrap();
    assert_eq!(stored.len(), 3);

    let ids: Vec<&str> = stored.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "CO1-01-SDM-WA7-01012024-DWD",
            "CO2-04-DOR-BS3-01012024-LVM",
            "CO3-02-SDM-US-CS1-01012024-DWD",
        ]
    );

    let loss = &stored[1];
    assert_eq!(loss.buyer_code, BuyerCode::Bs);
    assert_eq!(loss.site, Site::Dor);
    assert_eq!(loss.profit, -40.0);
    assert_eq!(loss.roi, -20.0);

    // Region qualifier shifts the buyer segment; account, site and series stay positional
    let thousands = &stored[2];
    assert_eq!(thousands.buyer_code, BuyerCode::Cs);
    assert_eq!(thousands.account_code, "CO3-02");
    assert_eq!(thousands.series_code, "DWD");
    assert_eq!(thousands.spend, 1000.0);
    assert_eq!(thousands.revenue, 1100.0);

    for record in &stored {
        assert!(record.validate().is_ok(), "{:?}", record);
    }
}

#[test]
fn test_header_without_skip_is_rejected_line() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(&temp_dir);

    let report = ctx
        .import_service
        .import_text(DAY_ONE, &ImportOptions::default())
        .unwrap();
    assert_eq!(report.accepted, 3);
    assert_eq!(report.rejected, 1);
    assert_eq!(report.errors[0].line_number, 1);
    // Header words carry no digits, so no metric can be isolated
    assert_eq!(report.errors[0].reason, RejectReason::MetricIsolationFailed);
}

#[test]
fn test_reimport_updates_only_matching_campaigns() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(&temp_dir);

    ctx.import_service.import_text(DAY_ONE, &with_header()).unwrap();

    let correction = "CO2-04 DOR BS3 01012024 LVM 5% 200 210 10 0,30 1,5% 2,10";
    let report = ctx
        .import_service
        .import_text(correction, &ImportOptions::default())
        .unwrap();
    assert_eq!(report.inserted, 0);
    assert_eq!(report.updated, 1);

    let stored = ctx.repository.campaigns_for_day(day(2024, 1, 1)).unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[1].revenue, 210.0);
    assert_eq!(stored[1].profit, 10.0);
}

#[test]
fn test_mixed_days_and_bad_lines() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(&temp_dir);

    let text = "\
CO1-01 SDM WA7 01012024 DWD 15% 100 150 50 0,5 2% 5
CO1-01 SDM WA7 02012024 DWD 15% 100 120 20 0,5 2% 5
CO1-01 SDM WA7 31022024 DWD 15% 100 120 20 0,5 2% 5
CO1-01 XYZ WA7 02012024 DWD 15% 100 120 20 0,5 2% 5
CO1-01 SDM WA7 DWD 15% 100 120 20 0,5 2% 5
";
    let report = ctx
        .import_service
        .import_text(text, &ImportOptions::default())
        .unwrap();

    assert_eq!(report.accepted, 2);
    assert_eq!(report.days, vec![day(2024, 1, 1), day(2024, 1, 2)]);
    assert_eq!(report.reject_counts[&RejectReason::InvalidDate], 1);
    assert_eq!(report.reject_counts[&RejectReason::MissingSite], 1);
    assert_eq!(report.reject_counts[&RejectReason::MissingDate], 1);

    let numbers: Vec<usize> = report.errors.iter().map(|e| e.line_number).collect();
    assert_eq!(numbers, vec![3, 4, 5]);

    let status = ctx.status_service.get_status().unwrap();
    assert_eq!(status.total_campaigns, 2);
    assert_eq!(status.date_range.earliest, Some(day(2024, 1, 1)));
    assert_eq!(status.date_range.latest, Some(day(2024, 1, 2)));
}

#[test]
fn test_earnings_as_profit_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(&temp_dir);

    let options = ImportOptions {
        earnings_column: EarningsColumn::Profit,
        reference_date: Some(day(2024, 5, 10)),
        ..Default::default()
    };
    let report = ctx
        .import_service
        .import_text("CO1-01 SDM WA7 DWD 15% 100 30 0 0,5 2% 5", &options)
        .unwrap();
    assert_eq!(report.days, vec![day(2024, 5, 10)]);

    let stored = ctx.repository.campaigns_for_day(day(2024, 5, 10)).unwrap();
    assert_eq!(stored[0].revenue, 130.0);
    assert_eq!(stored[0].profit, 30.0);
}

// ============================================================================
// Settings and catalog
// ============================================================================

#[test]
fn test_catalog_overrides_from_settings() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("settings.json"),
        r#"{ "catalog": { "buyers": { "BS": "Bruno S." }, "series": { "LVM": "Série LVM" } } }"#,
    )
    .unwrap();
    let ctx = open_context(&temp_dir);

    ctx.import_service.import_text(DAY_ONE, &with_header()).unwrap();
    let detail = ctx.status_service.get_day(day(2024, 1, 1)).unwrap();

    assert_eq!(detail.campaigns[0].buyer, "Wilian Wegner");
    assert_eq!(detail.campaigns[1].buyer, "Bruno S.");
    assert_eq!(detail.campaigns[1].series, "Série LVM");
    assert_eq!(detail.campaigns[2].series, "Série DWD");
    assert_eq!(detail.totals.spend, 1300.0);
    assert_eq!(detail.totals.revenue, 1410.0);
}

// ============================================================================
// Export and removal
// ============================================================================

#[test]
fn test_export_after_import() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(&temp_dir);
    ctx.import_service.import_text(DAY_ONE, &with_header()).unwrap();

    let mut out = Vec::new();
    let rows = ctx.export_service.write_csv(None, &mut out).unwrap();
    assert_eq!(rows, 3);

    let mut reader = csv::Reader::from_reader(out.as_slice());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "id");
    let first = reader.records().next().unwrap().unwrap();
    assert_eq!(&first[0], "CO1-01-SDM-WA7-01012024-DWD");
    assert_eq!(&first[1], "2024-01-01");
}

#[test]
fn test_remove_day_keeps_other_days() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(&temp_dir);

    let text = "\
CO1-01 SDM WA7 01012024 DWD 15% 100 150 50 0,5 2% 5
CO1-01 SDM WA7 02012024 DWD 15% 100 120 20 0,5 2% 5
";
    ctx.import_service
        .import_text(text, &ImportOptions::default())
        .unwrap();

    assert_eq!(ctx.import_service.remove_day(day(2024, 1, 1)).unwrap(), 1);
    let status = ctx.status_service.get_status().unwrap();
    assert_eq!(status.total_days, 1);
    assert_eq!(status.days[0].day, day(2024, 1, 2));
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let ctx = open_context(&temp_dir);
        ctx.import_service.import_text(DAY_ONE, &with_header()).unwrap();
    }

    let ctx = open_context(&temp_dir);
    assert_eq!(ctx.repository.count().unwrap(), 3);
    assert!(temp_dir.path().join("campaigns.duckdb").exists());
}

#[test]
fn test_repository_as_trait_object() {
    let temp_dir = TempDir::new().unwrap();
    let repo = DuckDbRepository::new(&temp_dir.path().join("store.duckdb")).unwrap();
    repo.ensure_schema().unwrap();
    let store: Arc<dyn CampaignStore> = Arc::new(repo);

    assert_eq!(store.count().unwrap(), 0);
    assert!(store.list_days().unwrap().is_empty());
    assert!(store.existing_ids(day(2024, 1, 1)).unwrap().is_empty());
}

#[test]
fn test_parallel_imports_share_one_context() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(&temp_dir);

    std::thread::scope(|s| {
        for d in 1..=4u32 {
            let service = &ctx.import_service;
            s.spawn(move || {
                let line = format!("CO1-01 SDM WA7 0{}012024 DWD 15% 100 150 50 0,5 2% 5", d);
                service
                    .import_text(&line, &ImportOptions::default())
                    .unwrap();
            });
        }
    });

    let status = ctx.status_service.get_status().unwrap();
    assert_eq!(status.total_days, 4);
    assert_eq!(status.total_campaigns, 4);
}

// ============================================================================
// Atomic multi-day writes
// ============================================================================

/// Real store that refuses any batch touching one poisoned day
struct RefusingStore {
    inner: DuckDbRepository,
    refused: NaiveDate,
}

impl CampaignStore for RefusingStore {
    fn save_days(&self, days: &BTreeMap<NaiveDate, Vec<CampaignRecord>>, batch_id: &str) -> Result<()> {
        if days.contains_key(&self.refused) {
            bail!("disk full while writing {}", self.refused);
        }
        self.inner.save_days(days, batch_id)
    }

    fn delete_day(&self, day: NaiveDate) -> Result<usize> {
        self.inner.delete_day(day)
    }

    fn campaigns_for_day(&self, day: NaiveDate) -> Result<Vec<CampaignRecord>> {
        self.inner.campaigns_for_day(day)
    }

    fn existing_ids(&self, day: NaiveDate) -> Result<HashSet<String>> {
        self.inner.existing_ids(day)
    }

    fn list_days(&self) -> Result<Vec<DaySummary>> {
        self.inner.list_days()
    }

    fn count(&self) -> Result<i64> {
        self.inner.count()
    }
}

#[test]
fn test_failed_save_leaves_no_day_half_imported() {
    let temp_dir = TempDir::new().unwrap();
    let inner = DuckDbRepository::new(&temp_dir.path().join("store.duckdb")).unwrap();
    inner.ensure_schema().unwrap();
    let store = Arc::new(RefusingStore {
        inner,
        refused: day(2024, 1, 2),
    });
    let service = ImportService::new(store.clone(), Catalog::default());

    let text = "\
CO1-01 SDM WA7 01012024 DWD 15% 100 150 50 0,5 2% 5
CO1-01 SDM WA7 02012024 DWD 15% 100 120 20 0,5 2% 5
";
    let err = service
        .import_text(text, &ImportOptions::default())
        .unwrap_err();
    assert!(format!("{:#}", err).contains("disk full"));

    assert_eq!(store.count().unwrap(), 0);
    assert!(store.list_days().unwrap().is_empty());
}
