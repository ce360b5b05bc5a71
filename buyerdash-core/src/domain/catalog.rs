//! Display-name lookup tables for buyers, sites and series
//!
//! The catalog is handed to whoever presents records; the ingestion parser
//! never consults it. Unknown codes fall back to the code itself.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::campaign::{BuyerCode, CampaignRecord, Site};

const DEFAULT_BUYERS: &[(&str, &str)] = &[
    ("WA", "Wilian Wegner"),
    ("BS", "Bruno Santana"),
    ("CS", "Cicero Severo"),
];

const DEFAULT_SITES: &[(&str, &str)] = &[
    ("DOR", "Site Principal (DOR)"),
    ("SDM", "Site Direto (SDM)"),
];

const DEFAULT_SERIES: &[(&str, &str)] = &[
    ("DWD", "Série DWD"),
    ("SBTB", "Série SBTB"),
    ("LVM", "Série LVM"),
    ("HVRF", "Série HVRF"),
    ("EMF", "Série EMF"),
    ("RGM", "Série RGM"),
    ("CF", "Série CF"),
    ("SPV", "Série SPV"),
    ("TMBS", "Série TMBS"),
    ("DTMW", "Série DTMW"),
    ("DMWG", "Série DMWG"),
    ("TRTF", "Série TRTF"),
    ("KLWL", "Série KLWL"),
    ("TLQR", "Série TLQR"),
    ("DTMN", "Série DTMN"),
];

fn to_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Read-only code → display name tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub buyers: BTreeMap<String, String>,
    pub sites: BTreeMap<String, String>,
    pub series: BTreeMap<String, String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            buyers: to_map(DEFAULT_BUYERS),
            sites: to_map(DEFAULT_SITES),
            series: to_map(DEFAULT_SERIES),
        }
    }
}

/// Partial catalog as written in settings.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogOverrides {
    #[serde(default)]
    pub buyers: BTreeMap<String, String>,
    #[serde(default)]
    pub sites: BTreeMap<String, String>,
    #[serde(default)]
    pub series: BTreeMap<String, String>,
}

impl CatalogOverrides {
    pub fn is_empty(&self) -> bool {
        self.buyers.is_empty() && self.sites.is_empty() && self.series.is_empty()
    }
}

impl Catalog {
    /// Default tables with user overrides layered on top
    pub fn with_overrides(overrides: &CatalogOverrides) -> Self {
        let mut catalog = Self::default();
        catalog.buyers.extend(overrides.buyers.clone());
        catalog.sites.extend(overrides.sites.clone());
        catalog.series.extend(overrides.series.clone());
        catalog
    }

    pub fn buyer_name(&self, code: BuyerCode) -> String {
        self.buyers
            .get(code.as_str())
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    pub fn site_name(&self, site: Site) -> String {
        self.sites
            .get(site.as_str())
            .cloned()
            .unwrap_or_else(|| site.to_string())
    }

    /// Series codes are not validated, so unknown ones pass through unchanged
    pub fn series_name(&self, code: &str) -> String {
        self.series
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    pub fn enrich(&self, record: &CampaignRecord) -> CampaignView {
        CampaignView {
            id: record.id.clone(),
            date: record.date,
            buyer_code: record.buyer_code,
            buyer: self.buyer_name(record.buyer_code),
            account_code: record.account_code.clone(),
            site: self.site_name(record.site),
            series_code: record.series_code.clone(),
            series: self.series_name(&record.series_code),
            spend: record.spend,
            revenue: record.revenue,
            profit: record.profit,
            roi: record.roi,
            cpc: record.cpc,
            ctr: record.ctr,
            ecpm: record.ecpm,
        }
    }
}

/// A record with display names resolved, for tables and exports
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignView {
    pub id: String,
    pub date: NaiveDate,
    pub buyer_code: BuyerCode,
    pub buyer: String,
    pub account_code: String,
    pub site: String,
    pub series_code: String,
    pub series: String,
    pub spend: f64,
    pub revenue: f64,
    pub profit: f64,
    pub roi: f64,
    pub cpc: f64,
    pub ctr: f64,
    pub ecpm: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let catalog = Catalog::default();
        assert_eq!(catalog.buyer_name(BuyerCode::Wa), "Wilian Wegner");
        assert_eq!(catalog.site_name(Site::Sdm), "Site Direto (SDM)");
        assert_eq!(catalog.series_name("DWD"), "Série DWD");
    }

    #[test]
    fn test_series_keys_are_single_segments() {
        // series_code is the last identifier segment, so keys with a delimiter never match
        let catalog = Catalog::default();
        for key in catalog.series.keys() {
            assert!(!key.contains(crate::domain::IDENTIFIER_DELIMITER), "{}", key);
        }
    }

    #[test]
    fn test_unknown_series_passes_through() {
        let catalog = Catalog::default();
        assert_eq!(catalog.series_name("NEWX"), "NEWX");
    }

    #[test]
    fn test_overrides_replace_and_extend() {
        let mut overrides = CatalogOverrides::default();
        overrides
            .buyers
            .insert("WA".to_string(), "W. Wegner".to_string());
        overrides
            .series
            .insert("NEWX".to_string(), "Série Nova".to_string());

        let catalog = Catalog::with_overrides(&overrides);
        assert_eq!(catalog.buyer_name(BuyerCode::Wa), "W. Wegner");
        assert_eq!(catalog.buyer_name(BuyerCode::Bs), "Bruno Santana");
        assert_eq!(catalog.series_name("NEWX"), "Série Nova");
        assert_eq!(catalog.series_name("DWD"), "Série DWD");
    }
}
