#![allow(dead_code)]

use brandspend::domain::error::BrandspendError;
use brandspend::domain::record::{Amount, Brand, DailySpend, SpendRecord};
use brandspend::ports::data_port::DataPort;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub struct MockDataPort {
    pub records: Vec<SpendRecord>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            error: None,
        }
    }

    pub fn with_records(mut self, records: Vec<SpendRecord>) -> Self {
        self.records = records;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }

    fn check(&self) -> Result<(), BrandspendError> {
        match &self.error {
            Some(reason) => Err(BrandspendError::Database {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl DataPort for MockDataPort {
    fn snapshot(&self) -> Result<Vec<SpendRecord>, BrandspendError> {
        self.check()?;
        Ok(self.records.clone())
    }

    fn list_brands(&self, limit: usize) -> Result<Vec<Brand>, BrandspendError> {
        self.check()?;
        let mut brands = BTreeMap::new();
        for r in &self.records {
            brands.entry(r.brand_id).or_insert_with(|| Brand {
                brand_id: r.brand_id,
                brand_name: r.brand_name.clone(),
                industry_name: r.industry_name.clone(),
            });
        }
        Ok(brands.into_values().take(limit).collect())
    }

    fn list_daily_spend(&self, limit: usize) -> Result<Vec<DailySpend>, BrandspendError> {
        self.check()?;
        Ok(self
            .records
            .iter()
            .take(limit)
            .map(|r| DailySpend {
                brand_id: r.brand_id,
                brand_name: r.brand_name.clone(),
                spend_date: r.spend_date,
                spend_amount: r.amount.value(),
            })
            .collect())
    }
}

pub fn make_record(id: i64, name: &str, industry: &str, state: &str, amount: Decimal) -> SpendRecord {
    SpendRecord::new(id, name, industry, state, amount)
}

pub fn make_bad_record(id: i64, name: &str, amount: Amount) -> SpendRecord {
    SpendRecord::new(id, name, "Tech", "CA", amount)
}

/// A small mixed dataset: three brands, three industries, four states.
pub fn sample_records() -> Vec<SpendRecord> {
    let day = |d: u32| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
    vec![
        make_record(1, "Acme", "Tech", "CA", Decimal::new(1200, 0)).on(day(1)),
        make_record(1, "Acme", "Tech", "NY", Decimal::new(800, 0)).on(day(2)),
        make_record(2, "Bolt", "Retail", "TX", Decimal::new(150050, 2)).on(day(1)),
        make_record(3, "Core", "Media", "WA", Decimal::new(2500, 0)).on(day(3)),
        make_record(3, "Core", "Media", "CA", Decimal::new(-100, 0)).on(day(4)),
    ]
}

pub fn sample_csv() -> &'static str {
    "brand_id,brand_name,industry_name,state_abbr,amount,spend_date\n\
     1,Acme,Tech,CA,1200,2024-03-01\n\
     1,Acme,Tech,NY,800,2024-03-02\n\
     2,Bolt,Retail,TX,1500.50,2024-03-01\n\
     3,Core,Media,WA,2500,2024-03-03\n\
     3,Core,Media,CA,-100,2024-03-04\n"
}
