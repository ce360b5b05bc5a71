//! Freeform tabular-text ingestion
//!
//! Turns a block of text pasted from a spreadsheet into typed campaign
//! records. Each non-blank line moves through
//! tokenizing → metrics isolated → identifier classified → fields derived,
//! and ends either accepted (a [`CampaignRecord`]) or rejected with a
//! [`RejectReason`]. A bad line never stops the batch.
//!
//! Parsing is pure: no I/O, no shared state, and the same input always
//! produces the same output in line order.

pub mod derive;
pub mod identifier;
pub mod numeric;
pub mod tokens;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{CampaignRecord, CampaignStatus};

pub use derive::{EarningsColumn, Financials, MonetaryInput};
pub use identifier::IdentifierError;
pub use numeric::{parse_currency, parse_percentage};
pub use tokens::{MetricFields, SplitError};

/// Where record dates come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePolicy {
    /// Read the `DDMMYYYY` segment of each identifier
    FromIdentifier,
    /// Stamp every record with this date, ignoring identifier dates
    ReferenceForAll(NaiveDate),
}

/// Immutable parser configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    date_policy: DatePolicy,
    earnings_column: EarningsColumn,
}

impl ParseConfig {
    /// Build a config from the caller's switches
    ///
    /// Fails when the reference date is requested for all rows but none was given.
    pub fn new(
        use_reference_date_for_all: bool,
        reference_date: Option<NaiveDate>,
        earnings_column: EarningsColumn,
    ) -> Result<Self> {
        let date_policy = if use_reference_date_for_all {
            let date = reference_date.ok_or_else(|| {
                Error::config("a reference date is required when it applies to all rows")
            })?;
            DatePolicy::ReferenceForAll(date)
        } else {
            DatePolicy::FromIdentifier
        };

        Ok(Self {
            date_policy,
            earnings_column,
        })
    }

    pub fn with_policy(date_policy: DatePolicy, earnings_column: EarningsColumn) -> Self {
        Self {
            date_policy,
            earnings_column,
        }
    }

    pub fn date_policy(&self) -> DatePolicy {
        self.date_policy
    }

    pub fn earnings_column(&self) -> EarningsColumn {
        self.earnings_column
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self::with_policy(DatePolicy::FromIdentifier, EarningsColumn::default())
    }
}

/// Broad class of a rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectCategory {
    /// The line does not have the expected shape
    Structural,
    /// The line has the shape but breaks a business rule
    Semantic,
    /// Processing the line faulted
    Exceptional,
}

/// Why a line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    TooFewColumns,
    MetricIsolationFailed,
    InvalidIdentifier,
    MissingBuyerCode,
    MissingAccountCode,
    MissingSite,
    MissingDate,
    InvalidMonetaryValues,
    InvalidDate,
    UnexpectedError,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::TooFewColumns => "too_few_columns",
            RejectReason::MetricIsolationFailed => "metric_isolation_failed",
            RejectReason::InvalidIdentifier => "invalid_identifier",
            RejectReason::MissingBuyerCode => "missing_buyer_code",
            RejectReason::MissingAccountCode => "missing_account_code",
            RejectReason::MissingSite => "missing_site",
            RejectReason::MissingDate => "missing_date",
            RejectReason::InvalidMonetaryValues => "invalid_monetary_values",
            RejectReason::InvalidDate => "invalid_date",
            RejectReason::UnexpectedError => "unexpected_error",
        }
    }

    pub fn category(&self) -> RejectCategory {
        match self {
            RejectReason::TooFewColumns
            | RejectReason::MetricIsolationFailed
            | RejectReason::InvalidIdentifier => RejectCategory::Structural,
            RejectReason::UnexpectedError => RejectCategory::Exceptional,
            _ => RejectCategory::Semantic,
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SplitError> for RejectReason {
    fn from(err: SplitError) -> Self {
        match err {
            SplitError::TooFewColumns => RejectReason::TooFewColumns,
            SplitError::MetricIsolationFailed => RejectReason::MetricIsolationFailed,
            SplitError::EmptyIdentifier => RejectReason::InvalidIdentifier,
        }
    }
}

impl From<IdentifierError> for RejectReason {
    fn from(err: IdentifierError) -> Self {
        match err {
            IdentifierError::NoDelimiter => RejectReason::InvalidIdentifier,
            IdentifierError::MissingBuyerCode => RejectReason::MissingBuyerCode,
            IdentifierError::MissingAccountCode => RejectReason::MissingAccountCode,
            IdentifierError::MissingSite => RejectReason::MissingSite,
        }
    }
}

/// A rejected line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineError {
    /// 1-based line in the pasted text
    pub line_number: usize,
    pub reason: RejectReason,
    pub raw_line: String,
}

/// Everything one `parse` call produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseOutcome {
    pub records: Vec<CampaignRecord>,
    pub errors: Vec<LineError>,
}

impl ParseOutcome {
    /// Lines that reached a terminal state
    pub fn line_count(&self) -> usize {
        self.records.len() + self.errors.len()
    }
}

/// Parse a pasted block into records and per-line errors
pub fn parse(raw_text: &str, config: &ParseConfig) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for line in tokens::split_lines(raw_text) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| parse_line(line.text, config)))
            .unwrap_or(Err(RejectReason::UnexpectedError));

        match result {
            Ok(record) => outcome.records.push(record),
            Err(reason) => outcome.errors.push(LineError {
                line_number: line.number,
                reason,
                raw_line: line.text.to_string(),
            }),
        }
    }

    outcome
}

/// Run one line through the whole pipeline
pub fn parse_line(line: &str, config: &ParseConfig) -> std::result::Result<CampaignRecord, RejectReason> {
    let split = tokens::split_line(line)?;
    let classified = identifier::classify(&split.identifier)?;

    let date = match config.date_policy {
        DatePolicy::ReferenceForAll(date) => date,
        DatePolicy::FromIdentifier => {
            let segment = classified
                .date_segment
                .as_deref()
                .ok_or(RejectReason::MissingDate)?;
            identifier::parse_date_segment(segment).ok_or(RejectReason::InvalidDate)?
        }
    };

    let metrics = &split.metrics;
    let financials = derive::derive_financials(
        MonetaryInput {
            spend: parse_currency(&metrics.spend),
            earnings: parse_currency(&metrics.earnings),
            profit_column: parse_currency(&metrics.profit),
        },
        config.earnings_column,
    )
    .ok_or(RejectReason::InvalidMonetaryValues)?;

    let roi = parse_percentage(&metrics.roi)
        .unwrap_or_else(|| CampaignRecord::computed_roi(financials.spend, financials.profit));

    Ok(CampaignRecord {
        id: split.identifier,
        date,
        buyer_code: classified.buyer_code,
        account_code: classified.account_code,
        site: classified.site,
        series_code: classified.series_code,
        spend: financials.spend,
        revenue: financials.revenue,
        profit: financials.profit,
        roi,
        cpc: parse_currency(&metrics.cpc).unwrap_or(0.0),
        ctr: parse_percentage(&metrics.ctr).unwrap_or(0.0),
        ecpm: parse_currency(&metrics.ecpm).unwrap_or(0.0),
        status: CampaignStatus::Active,
    })
}
