//! PostgreSQL record store adapter.

use crate::domain::error::BrandspendError;
use crate::domain::record::{Amount, Brand, DailySpend, SpendRecord};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use postgres::NoTls;
use r2d2::{Pool, PooledConnection};
use r2d2_postgres::PostgresConnectionManager;
use rust_decimal::Decimal;
use std::time::Duration;

type Manager = PostgresConnectionManager<NoTls>;

pub struct PostgresAdapter {
    pool: Pool<Manager>,
}

fn query_err(e: postgres::Error) -> BrandspendError {
    BrandspendError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// NUMERIC columns decode through rust_decimal; anything it cannot represent
/// is kept as a malformed amount rather than failing the snapshot.
fn amount_from_row(row: &postgres::Row, idx: usize) -> Amount {
    match row.try_get::<_, Option<Decimal>>(idx) {
        Ok(value) => value.into(),
        Err(e) => Amount::Malformed(e.to_string()),
    }
}

fn record_from_row(row: &postgres::Row) -> Result<SpendRecord, postgres::Error> {
    Ok(SpendRecord {
        brand_id: row.try_get(0)?,
        brand_name: row.try_get(1)?,
        industry_name: row.try_get(2)?,
        state_abbr: row.try_get(3)?,
        amount: amount_from_row(row, 4),
        spend_date: row.try_get(5)?,
    })
}

fn brand_from_row(row: &postgres::Row) -> Result<Brand, postgres::Error> {
    Ok(Brand {
        brand_id: row.try_get(0)?,
        brand_name: row.try_get(1)?,
        industry_name: row.try_get(2)?,
    })
}

fn daily_spend_from_row(row: &postgres::Row) -> Result<DailySpend, postgres::Error> {
    Ok(DailySpend {
        brand_id: row.try_get(0)?,
        brand_name: row.try_get(1)?,
        spend_date: row.try_get(2)?,
        spend_amount: amount_from_row(row, 3).value(),
    })
}

impl PostgresAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, BrandspendError> {
        let connection_string = config
            .get_string("postgres", "connection_string")
            .ok_or_else(|| BrandspendError::ConfigMissing {
                section: "postgres".into(),
                key: "connection_string".into(),
            })?;

        let pg_config: postgres::Config =
            connection_string
                .parse()
                .map_err(|e: postgres::Error| BrandspendError::ConfigInvalid {
                    section: "postgres".into(),
                    key: "connection_string".into(),
                    reason: e.to_string(),
                })?;

        let pool_size = config.get_int("postgres", "pool_size", 4).max(1) as u32;
        let timeout = config.get_int("postgres", "connect_timeout_secs", 5).max(1) as u64;
        let manager = PostgresConnectionManager::new(pg_config, NoTls);
        // Unchecked: an unreachable server fails each read, not startup.
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_timeout(Duration::from_secs(timeout))
            .build_unchecked(manager);

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<Manager>, BrandspendError> {
        self.pool.get().map_err(|e| BrandspendError::Database {
            reason: e.to_string(),
        })
    }
}

impl DataPort for PostgresAdapter {
    fn snapshot(&self) -> Result<Vec<SpendRecord>, BrandspendError> {
        let mut client = self.conn()?;

        let mut tx = client
            .build_transaction()
            .isolation_level(postgres::IsolationLevel::RepeatableRead)
            .read_only(true)
            .start()
            .map_err(query_err)?;

        let query = "SELECT t.brand_id::bigint, b.brand_name, b.industry_name, t.state_abbr, \
                            t.spend_amount::numeric, t.spend_date \
                     FROM public.transactions t \
                     JOIN public.brands b ON b.brand_id = t.brand_id";

        let rows = tx.query(query, &[]).map_err(query_err)?;
        tx.commit().map_err(query_err)?;

        rows.iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_err)
    }

    fn list_brands(&self, limit: usize) -> Result<Vec<Brand>, BrandspendError> {
        let query = "SELECT brand_id::bigint, brand_name, industry_name \
                     FROM public.brands ORDER BY brand_id LIMIT $1";

        let rows = self
            .conn()?
            .query(query, &[&limit_param(limit)])
            .map_err(query_err)?;

        rows.iter()
            .map(brand_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_err)
    }

    fn list_daily_spend(&self, limit: usize) -> Result<Vec<DailySpend>, BrandspendError> {
        let query = "SELECT t.brand_id::bigint, b.brand_name, t.spend_date, t.spend_amount::numeric \
                     FROM public.transactions t \
                     JOIN public.brands b ON b.brand_id = t.brand_id \
                     ORDER BY t.spend_date ASC NULLS LAST, t.brand_id \
                     LIMIT $1";

        let rows = self
            .conn()?
            .query(query, &[&limit_param(limit)])
            .map_err(query_err)?;

        rows.iter()
            .map(daily_spend_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MapConfig(Vec<(&'static str, &'static str, &'static str)>);

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0
                .iter()
                .find(|(s, k, _)| *s == section && *k == key)
                .map(|(_, _, v)| v.to_string())
        }
        fn get_int(&self, _section: &str, _key: &str, default: i64) -> i64 {
            default
        }
        fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
            default
        }
    }

    #[test]
    fn from_config_missing_connection_string() {
        match PostgresAdapter::from_config(&MapConfig(vec![])) {
            Err(BrandspendError::ConfigMissing { section, key }) => {
                assert_eq!(section, "postgres");
                assert_eq!(key, "connection_string");
            }
            Err(other) => panic!("expected ConfigMissing, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn from_config_rejects_unparsable_connection_string() {
        let config = MapConfig(vec![("postgres", "connection_string", "host=localhost port=notanumber")]);
        assert!(matches!(
            PostgresAdapter::from_config(&config),
            Err(BrandspendError::ConfigInvalid { .. })
        ));
    }

    /// Needs a scratch database: the test replaces `public.brands` and
    /// `public.transactions`. Set `BRANDSPEND_TEST_POSTGRES` to its
    /// connection string.
    #[test]
    #[ignore]
    fn mistyped_date_column_is_a_query_error() {
        let Ok(conn) = std::env::var("BRANDSPEND_TEST_POSTGRES") else {
            eprintln!("Skipping: BRANDSPEND_TEST_POSTGRES not set.");
            return;
        };

        let mut client = postgres::Client::connect(&conn, NoTls).unwrap();
        client
            .batch_execute(
                "DROP TABLE IF EXISTS public.transactions;
                 DROP TABLE IF EXISTS public.brands;
                 CREATE TABLE public.brands (
                    brand_id BIGINT PRIMARY KEY, brand_name TEXT, industry_name TEXT);
                 CREATE TABLE public.transactions (
                    brand_id BIGINT, state_abbr TEXT, spend_amount NUMERIC, spend_date TEXT);
                 INSERT INTO public.brands VALUES (1, 'Acme', 'Tech');
                 INSERT INTO public.transactions VALUES (1, 'CA', 10, 'yesterday');",
            )
            .unwrap();

        let config = crate::adapters::file_config_adapter::FileConfigAdapter::from_string(
            &format!("[postgres]\nconnection_string = {conn}\n"),
        )
        .unwrap();
        let adapter = PostgresAdapter::from_config(&config).unwrap();
        assert!(matches!(
            adapter.snapshot(),
            Err(BrandspendError::DatabaseQuery { .. })
        ));
        assert!(matches!(
            adapter.list_daily_spend(10),
            Err(BrandspendError::DatabaseQuery { .. })
        ));
    }
}
