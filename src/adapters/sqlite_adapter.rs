//! SQLite record store adapter.

use crate::domain::error::BrandspendError;
use crate::domain::record::{Amount, Brand, DailySpend, SpendRecord};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use rusqlite::types::ValueRef;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_err(e: r2d2::Error) -> BrandspendError {
    BrandspendError::Database {
        reason: e.to_string(),
    }
}

fn query_err(e: rusqlite::Error) -> BrandspendError {
    BrandspendError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Map a raw column value onto an [`Amount`] without failing the row.
fn amount_from_sql(value: ValueRef<'_>) -> Amount {
    match value {
        ValueRef::Null => Amount::Missing,
        ValueRef::Integer(i) => Amount::Valid(i.into()),
        ValueRef::Real(f) => Amount::from_f64(f),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) => Amount::parse(s),
            Err(_) => Amount::Malformed(String::from_utf8_lossy(bytes).into_owned()),
        },
        ValueRef::Blob(_) => Amount::Malformed("<blob>".into()),
    }
}

fn date_from_sql(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

fn amount_to_sql(amount: &Amount) -> Option<String> {
    match amount {
        Amount::Valid(d) => Some(d.to_string()),
        Amount::Missing => None,
        Amount::Malformed(raw) => Some(raw.clone()),
    }
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, BrandspendError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| BrandspendError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        if db_path == ":memory:" {
            return Self::in_memory();
        }

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_err)?;

        tracing::debug!(path = %db_path, pool_size, "opened sqlite store");
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, BrandspendError> {
        // Every connection to :memory: is a separate database, so one connection only.
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager).map_err(pool_err)?;
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, BrandspendError> {
        self.pool.get().map_err(pool_err)
    }

    pub fn initialize_schema(&self) -> Result<(), BrandspendError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS brands (
                brand_id INTEGER PRIMARY KEY,
                brand_name TEXT NOT NULL,
                industry_name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS transactions (
                transaction_id INTEGER PRIMARY KEY AUTOINCREMENT,
                brand_id INTEGER NOT NULL REFERENCES brands(brand_id),
                brand_name TEXT NOT NULL,
                industry_name TEXT NOT NULL,
                state_abbr TEXT NOT NULL,
                spend_amount TEXT,
                spend_date TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_transactions_brand ON transactions(brand_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(spend_date);",
        )
        .map_err(query_err)?;

        Ok(())
    }

    /// Insert records in one transaction.
    ///
    /// Each transaction row keeps the brand name and industry it was imported
    /// with. The `brands` row used by the listing keeps the smallest name seen.
    pub fn insert_records(&self, records: &[SpendRecord]) -> Result<usize, BrandspendError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        for record in records {
            tx.execute(
                "INSERT INTO brands (brand_id, brand_name, industry_name) VALUES (?1, ?2, ?3)
                 ON CONFLICT(brand_id) DO UPDATE SET
                    brand_name = min(brands.brand_name, excluded.brand_name)",
                params![record.brand_id, record.brand_name, record.industry_name],
            )
            .map_err(query_err)?;

            tx.execute(
                "INSERT INTO transactions
                    (brand_id, brand_name, industry_name, state_abbr, spend_amount, spend_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.brand_id,
                    record.brand_name,
                    record.industry_name,
                    record.state_abbr,
                    amount_to_sql(&record.amount),
                    record.spend_date.map(|d| d.format("%Y-%m-%d").to_string()),
                ],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)?;
        tracing::info!(records = records.len(), "inserted records");
        Ok(records.len())
    }
}

impl DataPort for SqliteAdapter {
    fn snapshot(&self) -> Result<Vec<SpendRecord>, BrandspendError> {
        let conn = self.conn()?;

        // A single SELECT reads from one consistent database snapshot.
        let query = "SELECT brand_id, brand_name, industry_name, state_abbr,
                            spend_amount, spend_date
                     FROM transactions";

        let mut stmt = conn.prepare(query).map_err(query_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(SpendRecord {
                    brand_id: row.get(0)?,
                    brand_name: row.get(1)?,
                    industry_name: row.get(2)?,
                    state_abbr: row.get(3)?,
                    amount: amount_from_sql(row.get_ref(4)?),
                    spend_date: date_from_sql(row.get(5)?),
                })
            })
            .map_err(query_err)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(query_err)?);
        }

        Ok(records)
    }

    fn list_brands(&self, limit: usize) -> Result<Vec<Brand>, BrandspendError> {
        let conn = self.conn()?;

        let query = "SELECT brand_id, brand_name, industry_name
                     FROM brands ORDER BY brand_id LIMIT ?1";

        let mut stmt = conn.prepare(query).map_err(query_err)?;
        let rows = stmt
            .query_map(params![limit_param(limit)], |row| {
                Ok(Brand {
                    brand_id: row.get(0)?,
                    brand_name: row.get(1)?,
                    industry_name: row.get(2)?,
                })
            })
            .map_err(query_err)?;

        let mut brands = Vec::new();
        for row in rows {
            brands.push(row.map_err(query_err)?);
        }

        Ok(brands)
    }

    fn list_daily_spend(&self, limit: usize) -> Result<Vec<DailySpend>, BrandspendError> {
        let conn = self.conn()?;

        let query = "SELECT brand_id, brand_name, spend_date, spend_amount
                     FROM transactions
                     ORDER BY spend_date IS NULL, spend_date, brand_id, transaction_id
                     LIMIT ?1";

        let mut stmt = conn.prepare(query).map_err(query_err)?;
        let rows = stmt
            .query_map(params![limit_param(limit)], |row| {
                Ok(DailySpend {
                    brand_id: row.get(0)?,
                    brand_name: row.get(1)?,
                    spend_date: date_from_sql(row.get(2)?),
                    spend_amount: amount_from_sql(row.get_ref(3)?).value(),
                })
            })
            .map_err(query_err)?;

        let mut spends = Vec::new();
        for row in rows {
            spends.push(row.map_err(query_err)?);
        }

        Ok(spends)
    }
}
