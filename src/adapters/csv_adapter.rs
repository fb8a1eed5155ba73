//! CSV file record store adapter.
//!
//! Expected columns: `brand_id,brand_name,industry_name,state_abbr,amount[,spend_date]`.
//! A bad amount is kept on the record as malformed; a bad id or a missing
//! column fails the read.

use crate::domain::error::BrandspendError;
use crate::domain::record::{Amount, Brand, DailySpend, SpendRecord};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Parse transaction records from any CSV source with a header row.
pub fn read_records<R: Read>(source: R) -> Result<Vec<SpendRecord>, BrandspendError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source);
    let mut records = Vec::new();

    for result in rdr.records() {
        let row = result.map_err(|e| BrandspendError::Import {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            reason: format!("CSV parse error: {}", e),
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let column = |idx: usize, name: &str| {
            row.get(idx).ok_or_else(|| BrandspendError::Import {
                line,
                reason: format!("missing {} column", name),
            })
        };

        let brand_id: i64 = column(0, "brand_id")?
            .parse()
            .map_err(|e| BrandspendError::Import {
                line,
                reason: format!("invalid brand_id: {}", e),
            })?;
        let brand_name = column(1, "brand_name")?.to_string();
        let industry_name = column(2, "industry_name")?.to_string();
        let state_abbr = column(3, "state_abbr")?.to_string();
        let amount = Amount::parse(column(4, "amount")?);

        let spend_date = match row.get(5).filter(|s| !s.is_empty()) {
            Some(s) => Some(NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
                BrandspendError::Import {
                    line,
                    reason: format!("invalid spend_date: {}", e),
                }
            })?),
            None => None,
        };

        records.push(SpendRecord {
            brand_id,
            brand_name,
            industry_name,
            state_abbr,
            amount,
            spend_date,
        });
    }

    Ok(records)
}

impl DataPort for CsvAdapter {
    fn snapshot(&self) -> Result<Vec<SpendRecord>, BrandspendError> {
        let file = File::open(&self.path).map_err(|e| BrandspendError::Database {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        read_records(file)
    }

    fn list_brands(&self, limit: usize) -> Result<Vec<Brand>, BrandspendError> {
        let mut brands: BTreeMap<i64, Brand> = BTreeMap::new();
        for record in self.snapshot()? {
            match brands.get_mut(&record.brand_id) {
                Some(brand) if record.brand_name < brand.brand_name => {
                    brand.brand_name = record.brand_name;
                }
                Some(_) => {}
                None => {
                    brands.insert(
                        record.brand_id,
                        Brand {
                            brand_id: record.brand_id,
                            brand_name: record.brand_name,
                            industry_name: record.industry_name,
                        },
                    );
                }
            }
        }
        Ok(brands.into_values().take(limit).collect())
    }

    fn list_daily_spend(&self, limit: usize) -> Result<Vec<DailySpend>, BrandspendError> {
        let mut records = self.snapshot()?;
        // Stable sort keeps file order within a day; undated rows go last.
        records.sort_by_key(|r| (r.spend_date.is_none(), r.spend_date, r.brand_id));
        Ok(records
            .into_iter()
            .take(limit)
            .map(|r| DailySpend {
                brand_id: r.brand_id,
                brand_name: r.brand_name,
                spend_date: r.spend_date,
                spend_amount: r.amount.value(),
            })
            .collect())
    }
}
