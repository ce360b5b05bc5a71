//! Campaign domain model

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::result::Error;

/// Delimiter separating the segments of a campaign identifier
pub const IDENTIFIER_DELIMITER: char = '-';

/// Media buyer, identified by the two-letter prefix of a buyer segment (e.g. `WA7`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuyerCode {
    #[serde(rename = "WA")]
    Wa,
    #[serde(rename = "BS")]
    Bs,
    #[serde(rename = "CS")]
    Cs,
}

impl BuyerCode {
    pub const ALL: [BuyerCode; 3] = [BuyerCode::Wa, BuyerCode::Bs, BuyerCode::Cs];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuyerCode::Wa => "WA",
            BuyerCode::Bs => "BS",
            BuyerCode::Cs => "CS",
        }
    }
}

impl fmt::Display for BuyerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuyerCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WA" => Ok(BuyerCode::Wa),
            "BS" => Ok(BuyerCode::Bs),
            "CS" => Ok(BuyerCode::Cs),
            other => Err(Error::validation(format!("unknown buyer code: {}", other))),
        }
    }
}

/// Site the campaign traffic lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Site {
    #[serde(rename = "DOR")]
    Dor,
    #[serde(rename = "SDM")]
    Sdm,
}

impl Site {
    pub const ALL: [Site; 2] = [Site::Dor, Site::Sdm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Site::Dor => "DOR",
            Site::Sdm => "SDM",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive: `sdm`, `Sdm` and `SDM` are the same site
impl FromStr for Site {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DOR" => Ok(Site::Dor),
            "SDM" => Ok(Site::Sdm),
            _ => Err(Error::validation(format!("unknown site: {}", s))),
        }
    }
}

/// Lifecycle status of a stored campaign
///
/// Every imported record is active; there is no transition at ingestion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Active,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Active => "active",
        }
    }
}

impl FromStr for CampaignStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CampaignStatus::Active),
            other => Err(Error::validation(format!("unknown campaign status: {}", other))),
        }
    }
}

/// One campaign's performance for one day, as read from a pasted line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    /// Normalized identifier; unique together with `date`
    pub id: String,
    pub date: NaiveDate,
    pub buyer_code: BuyerCode,
    /// First two identifier segments, e.g. `CO1-01`
    pub account_code: String,
    pub site: Site,
    /// Last identifier segment, kept verbatim
    pub series_code: String,
    pub spend: f64,
    pub revenue: f64,
    pub profit: f64,
    /// Return on investment, in percent
    pub roi: f64,
    pub cpc: f64,
    /// Click-through rate, in percent
    pub ctr: f64,
    pub ecpm: f64,
    pub status: CampaignStatus,
}

impl CampaignRecord {
    /// ROI derived from the monetary fields (0 when nothing was spent)
    pub fn computed_roi(spend: f64, profit: f64) -> f64 {
        if spend == 0.0 {
            0.0
        } else {
            profit / spend * 100.0
        }
    }

    /// Check the monetary invariant `profit == revenue - spend`
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.id.trim().is_empty() {
            return Err("campaign id cannot be empty");
        }
        if !self.spend.is_finite() || !self.revenue.is_finite() || !self.profit.is_finite() {
            return Err("monetary values must be finite");
        }
        if (self.profit - (self.revenue - self.spend)).abs() > 1e-9 {
            return Err("profit must equal revenue minus spend");
        }
        Ok(())
    }
}
