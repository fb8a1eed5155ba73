//! In-memory record store.
//!
//! Writers swap in a new `Arc<Vec<_>>`; readers clone the current `Arc`. A
//! snapshot therefore always sees one complete version of the records.

use crate::domain::error::BrandspendError;
use crate::domain::record::{Brand, DailySpend, SpendRecord};
use crate::ports::data_port::DataPort;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
pub struct MemoryAdapter {
    records: RwLock<Arc<Vec<SpendRecord>>>,
}

impl MemoryAdapter {
    pub fn new(records: Vec<SpendRecord>) -> Self {
        Self {
            records: RwLock::new(Arc::new(records)),
        }
    }

    fn current(&self) -> Result<Arc<Vec<SpendRecord>>, BrandspendError> {
        self.records
            .read()
            .map(|guard| Arc::clone(&*guard))
            .map_err(|_| BrandspendError::Database {
                reason: "record store lock poisoned".into(),
            })
    }

    /// Replace the whole record set atomically.
    pub fn replace(&self, records: Vec<SpendRecord>) -> Result<(), BrandspendError> {
        let mut guard = self.records.write().map_err(|_| BrandspendError::Database {
            reason: "record store lock poisoned".into(),
        })?;
        *guard = Arc::new(records);
        Ok(())
    }

    /// Append records as one atomic update.
    pub fn push(&self, new_records: &[SpendRecord]) -> Result<(), BrandspendError> {
        let mut guard = self.records.write().map_err(|_| BrandspendError::Database {
            reason: "record store lock poisoned".into(),
        })?;
        let mut next = Vec::with_capacity(guard.len() + new_records.len());
        next.extend_from_slice(guard.as_slice());
        next.extend_from_slice(new_records);
        *guard = Arc::new(next);
        Ok(())
    }
}

impl DataPort for MemoryAdapter {
    fn snapshot(&self) -> Result<Vec<SpendRecord>, BrandspendError> {
        Ok(self.current()?.as_ref().clone())
    }

    fn list_brands(&self, limit: usize) -> Result<Vec<Brand>, BrandspendError> {
        let records = self.current()?;
        let mut brands: BTreeMap<i64, Brand> = BTreeMap::new();
        for r in records.iter() {
            brands
                .entry(r.brand_id)
                .and_modify(|b| {
                    if r.brand_name < b.brand_name {
                        b.brand_name = r.brand_name.clone();
                    }
                })
                .or_insert_with(|| Brand {
                    brand_id: r.brand_id,
                    brand_name: r.brand_name.clone(),
                    industry_name: r.industry_name.clone(),
                });
        }
        Ok(brands.into_values().take(limit).collect())
    }

    fn list_daily_spend(&self, limit: usize) -> Result<Vec<DailySpend>, BrandspendError> {
        let records = self.current()?;
        let mut rows: Vec<&SpendRecord> = records.iter().collect();
        rows.sort_by_key(|r| (r.spend_date.is_none(), r.spend_date, r.brand_id));
        Ok(rows
            .into_iter()
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
