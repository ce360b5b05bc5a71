//! Campaign identifier classification
//!
//! Buyer and date segments are found by pattern anywhere in the identifier,
//! since real identifiers carry optional region qualifiers. Account, site and
//! series are positional.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::domain::{BuyerCode, Site, IDENTIFIER_DELIMITER};

static BUYER_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(WA|BS|CS)[0-9]+$").expect("buyer pattern is valid"));

static DATE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{2})([0-9]{2})([0-9]{4})$").expect("date pattern is valid"));

/// Why an identifier was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierError {
    NoDelimiter,
    MissingBuyerCode,
    MissingAccountCode,
    MissingSite,
}

/// Structured fields read out of an identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedIdentifier {
    pub buyer_code: BuyerCode,
    pub account_code: String,
    pub site: Site,
    pub series_code: String,
    /// Raw `DDMMYYYY` segment, if one was present
    pub date_segment: Option<String>,
}

/// Split on the delimiter, trimming and dropping empty segments
pub fn segments(identifier: &str) -> Vec<&str> {
    identifier
        .split(IDENTIFIER_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// First segment shaped like `WA12`; the code is its letter prefix
fn find_buyer_code(segments: &[&str]) -> Option<BuyerCode> {
    segments.iter().find_map(|segment| {
        BUYER_SEGMENT
            .captures(segment)
            .and_then(|caps| caps.get(1))
            .and_then(|prefix| prefix.as_str().parse().ok())
    })
}

fn find_date_segment(segments: &[&str]) -> Option<String> {
    segments
        .iter()
        .find(|segment| DATE_SEGMENT.is_match(segment))
        .map(|segment| segment.to_string())
}

pub fn classify(identifier: &str) -> Result<ClassifiedIdentifier, IdentifierError> {
    if !identifier.contains(IDENTIFIER_DELIMITER) {
        return Err(IdentifierError::NoDelimiter);
    }

    let segments = segments(identifier);

    let buyer_code = find_buyer_code(&segments).ok_or(IdentifierError::MissingBuyerCode)?;

    if segments.len() < 2 {
        return Err(IdentifierError::MissingAccountCode);
    }
    let account_code = format!("{}{}{}", segments[0], IDENTIFIER_DELIMITER, segments[1]);

    let site = segments
        .get(2)
        .and_then(|segment| segment.parse::<Site>().ok())
        .ok_or(IdentifierError::MissingSite)?;

    // Non-empty: at least three segments exist by now
    let series_code = segments[segments.len() - 1].to_string();

    Ok(ClassifiedIdentifier {
        buyer_code,
        account_code,
        site,
        series_code,
        date_segment: find_date_segment(&segments),
    })
}

/// Read a `DDMMYYYY` segment as a calendar date
pub fn parse_date_segment(segment: &str) -> Option<NaiveDate> {
    let caps = DATE_SEGMENT.captures(segment)?;
    let day = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
