//! Transaction records and the passthrough listing rows.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// Spend amount as read from a record store.
///
/// Stores hand bad values through as `Missing` / `Malformed` so a single bad
/// row is excluded at aggregation time instead of failing the whole read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Amount {
    Valid(Decimal),
    Missing,
    Malformed(String),
}

impl Amount {
    /// Parse a textual amount. Blank text is `Missing`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Amount::Missing;
        }
        match Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed)) {
            Ok(value) => Amount::Valid(value),
            Err(_) => Amount::Malformed(trimmed.to_string()),
        }
    }

    /// Convert a floating point amount, rejecting NaN and infinities.
    pub fn from_f64(value: f64) -> Self {
        match Decimal::try_from(value) {
            Ok(d) if value.is_finite() => Amount::Valid(d),
            _ => Amount::Malformed(value.to_string()),
        }
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            Amount::Valid(d) => Some(*d),
            _ => None,
        }
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::Valid(value)
    }
}

impl From<Option<Decimal>> for Amount {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(Amount::Missing, Amount::Valid)
    }
}

/// One transaction-level spend event.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendRecord {
    pub brand_id: i64,
    pub brand_name: String,
    pub industry_name: String,
    pub state_abbr: String,
    pub amount: Amount,
    pub spend_date: Option<NaiveDate>,
}

impl SpendRecord {
    pub fn new(
        brand_id: i64,
        brand_name: impl Into<String>,
        industry_name: impl Into<String>,
        state_abbr: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> Self {
        Self {
            brand_id,
            brand_name: brand_name.into(),
            industry_name: industry_name.into(),
            state_abbr: state_abbr.into(),
            amount: amount.into(),
            spend_date: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.spend_date = Some(date);
        self
    }
}

/// Row of the brand listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Brand {
    pub brand_id: i64,
    pub brand_name: String,
    pub industry_name: String,
}

/// Row of the daily spend listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySpend {
    pub brand_id: i64,
    pub brand_name: String,
    pub spend_date: Option<NaiveDate>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub spend_amount: Option<Decimal>,
}
