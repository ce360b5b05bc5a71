//! Spend / revenue / profit derivation

use serde::{Deserialize, Serialize};

/// How to read the ambiguous earnings column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EarningsColumn {
    /// Earnings are gross revenue; profit is recomputed from spend
    #[default]
    Revenue,
    /// Earnings are already net of spend
    Profit,
}

impl std::str::FromStr for EarningsColumn {
    type Err = crate::domain::result::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "revenue" => Ok(EarningsColumn::Revenue),
            "profit" => Ok(EarningsColumn::Profit),
            other => Err(crate::domain::result::Error::config(format!(
                "earnings column must be 'revenue' or 'profit', got '{}'",
                other
            ))),
        }
    }
}

/// Monetary inputs for one line, `None` where the text was not a number
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonetaryInput {
    pub spend: Option<f64>,
    pub earnings: Option<f64>,
    pub profit_column: Option<f64>,
}

/// Fully resolved monetary fields; `profit == revenue - spend` exactly
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Financials {
    pub spend: f64,
    pub revenue: f64,
    pub profit: f64,
}

fn add(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? + b?)
}

fn sub(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? - b?)
}

/// Resolve spend, revenue and profit, or `None` when they cannot all be known
pub fn derive_financials(input: MonetaryInput, earnings_column: EarningsColumn) -> Option<Financials> {
    let mut spend = input.spend;

    let (mut revenue, mut profit) = match earnings_column {
        EarningsColumn::Revenue => (input.earnings, sub(input.earnings, spend)),
        EarningsColumn::Profit => (add(spend, input.earnings), input.earnings),
    };

    // The raw profit column is only a fallback; it never overrides a recomputed profit
    if profit.is_none() {
        profit = input.profit_column;
    }

    if revenue.is_none() {
        revenue = add(spend, profit);
    }
    if profit.is_none() {
        profit = sub(revenue, spend);
    }
    if spend.is_none() {
        spend = sub(revenue, profit).filter(|derived| *derived >= 0.0);
    }

    let (spend, revenue) = (spend?, revenue?);
    if profit.is_none() {
        return None;
    }

    Some(Financials {
        spend,
        revenue,
        profit: revenue - spend,
    })
}
