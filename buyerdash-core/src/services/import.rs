//! Import service - pasted campaign text into day partitions

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{CampaignRecord, CampaignView, Catalog};
use crate::ingest::{self, EarningsColumn, LineError, ParseConfig, RejectReason};
use crate::ports::CampaignStore;

/// Options for one import run
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub earnings_column: EarningsColumn,
    /// When set, every record is dated this day and identifier dates are ignored
    pub reference_date: Option<NaiveDate>,
    /// Drop the first non-empty line (the spreadsheet header)
    pub skip_header: bool,
    /// Parse and report without writing anything
    pub preview: bool,
}

/// Import service for pasted campaign reports
pub struct ImportService {
    repository: Arc<dyn CampaignStore>,
    catalog: Catalog,
}

impl ImportService {
    pub fn new(repository: Arc<dyn CampaignStore>, catalog: Catalog) -> Self {
        Self { repository, catalog }
    }

    /// Parse a pasted block and upsert the accepted campaigns by day
    ///
    /// Fails only when no line could be read at all; individual bad lines are
    /// reported in [`ImportReport::errors`].
    pub fn import_text(&self, text: &str, options: &ImportOptions) -> Result<ImportReport> {
        let config = ParseConfig::new(
            options.reference_date.is_some(),
            options.reference_date,
            options.earnings_column,
        )?;

        let text = if options.skip_header {
            blank_header(text)
        } else {
            text.to_string()
        };

        let outcome = ingest::parse(&text, &config);
        let lines = outcome.line_count();
        let accepted = outcome.records.len();

        if accepted == 0 {
            bail!(
                "no campaigns could be read ({} line(s) rejected)",
                outcome.errors.len()
            );
        }

        let mut reject_counts: BTreeMap<RejectReason, usize> = BTreeMap::new();
        for error in &outcome.errors {
            *reject_counts.entry(error.reason).or_insert(0) += 1;
        }

        let by_day = group_by_day(outcome.records);
        let stored: usize = by_day.values().map(Vec::len).sum();
        let batch_id = format!("import_{}", Utc::now().format("%Y%m%dT%H%M%S%.3f"));

        let mut inserted = 0;
        let mut updated = 0;
        let mut days = Vec::with_capacity(by_day.len());

        for (day, records) in &by_day {
            let existing = self
                .repository
                .existing_ids(*day)
                .with_context(|| format!("Failed to read campaigns for {}", day))?;
            let replaced = records.iter().filter(|r| existing.contains(&r.id)).count();
            updated += replaced;
            inserted += records.len() - replaced;
            days.push(*day);
        }

        if !options.preview {
            self.repository
                .save_days(&by_day, &batch_id)
                .with_context(|| format!("Failed to save campaigns for {} day(s)", by_day.len()))?;
        }

        let records = if options.preview {
            Some(
                by_day
                    .values()
                    .flatten()
                    .map(|r| self.catalog.enrich(r))
                    .collect(),
            )
        } else {
            None
        };

        Ok(ImportReport {
            batch_id,
            lines,
            accepted,
            rejected: outcome.errors.len(),
            duplicates: accepted - stored,
            inserted,
            updated,
            days,
            preview: options.preview,
            errors: outcome.errors,
            reject_counts,
            records,
        })
    }

    /// Drop a whole day partition, e.g. to re-import it from scratch
    pub fn remove_day(&self, day: NaiveDate) -> Result<usize> {
        self.repository
            .delete_day(day)
            .with_context(|| format!("Failed to remove campaigns for {}", day))
    }
}

/// Replace the first non-blank line with an empty one so line numbers stay put
fn blank_header(text: &str) -> String {
    let mut skipped = false;
    text.lines()
        .map(|line| {
            if !skipped && !line.trim().is_empty() {
                skipped = true;
                ""
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Group records by day, keeping the last occurrence of each id within a day
fn group_by_day(records: Vec<CampaignRecord>) -> BTreeMap<NaiveDate, Vec<CampaignRecord>> {
    let mut by_day: BTreeMap<NaiveDate, Vec<CampaignRecord>> = BTreeMap::new();
    let mut positions: HashMap<(NaiveDate, String), usize> = HashMap::new();

    for record in records {
        let day_records = by_day.entry(record.date).or_default();
        match positions.get(&(record.date, record.id.clone())) {
            Some(&idx) => day_records[idx] = record,
            None => {
                positions.insert((record.date, record.id.clone()), day_records.len());
                day_records.push(record);
            }
        }
    }

    by_day
}

/// Outcome of an import run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub batch_id: String,
    /// Non-blank lines that were parsed
    pub lines: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Accepted lines superseded by a later line with the same id and day
    pub duplicates: usize,
    pub inserted: usize,
    pub updated: usize,
    pub days: Vec<NaiveDate>,
    pub preview: bool,
    pub errors: Vec<LineError>,
    pub reject_counts: BTreeMap<RejectReason, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<CampaignView>>,
}

impl ImportReport {
    /// `reason=count` pairs, for logging
    pub fn reject_summary(&self) -> String {
        self.reject_counts
            .iter()
            .map(|(reason, count)| format!("{}={}", reason, count))
            .collect::<Vec<_>>()
            .join(",")
    }
}
