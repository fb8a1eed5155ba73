//! The "get current summary" read operation.
//!
//! Each call takes its own snapshot from the store and builds a fresh
//! [`Summary`]; nothing is shared between calls.

use crate::domain::aggregation::Aggregation;
use crate::domain::error::BrandspendError;
use crate::domain::summary::{Summary, SummaryConfig};
use crate::ports::data_port::DataPort;

/// Aggregate the store's current snapshot.
///
/// Store failures surface as [`BrandspendError::DataUnavailable`]; no partial
/// summary is ever returned. Records with missing or malformed amounts are
/// logged and skipped.
pub fn get_summary(
    data_port: &dyn DataPort,
    config: &SummaryConfig,
) -> Result<Summary, BrandspendError> {
    let records = data_port
        .snapshot()
        .map_err(BrandspendError::into_unavailable)?;
    tracing::debug!(records = records.len(), "aggregating snapshot");

    let agg = Aggregation::compute(&records);
    if !agg.issues.is_empty() {
        tracing::warn!(
            excluded = agg.issues.len(),
            included = agg.num_transactions(),
            "summary built with data-quality issues"
        );
    }

    Ok(Summary::assemble(&agg, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{Brand, DailySpend, SpendRecord};
    use rust_decimal::dec;

    struct FixedStore(Vec<SpendRecord>);

    impl DataPort for FixedStore {
        fn snapshot(&self) -> Result<Vec<SpendRecord>, BrandspendError> {
            Ok(self.0.clone())
        }
        fn list_brands(&self, _limit: usize) -> Result<Vec<Brand>, BrandspendError> {
            Ok(vec![])
        }
        fn list_daily_spend(&self, _limit: usize) -> Result<Vec<DailySpend>, BrandspendError> {
            Ok(vec![])
        }
    }

    struct DownStore;

    impl DataPort for DownStore {
        fn snapshot(&self) -> Result<Vec<SpendRecord>, BrandspendError> {
            Err(BrandspendError::Database {
                reason: "connection refused".into(),
            })
        }
        fn list_brands(&self, _limit: usize) -> Result<Vec<Brand>, BrandspendError> {
            Ok(vec![])
        }
        fn list_daily_spend(&self, _limit: usize) -> Result<Vec<DailySpend>, BrandspendError> {
            Ok(vec![])
        }
    }

    #[test]
    fn empty_store_is_not_an_error() {
        let summary = get_summary(&FixedStore(vec![]), &SummaryConfig::default()).unwrap();
        assert_eq!(summary, Summary::empty());
    }

    #[test]
    fn unavailable_store_fails() {
        match get_summary(&DownStore, &SummaryConfig::default()) {
            Err(BrandspendError::DataUnavailable { reason }) => {
                assert_eq!(reason, "connection refused")
            }
            other => panic!("expected DataUnavailable, got: {other:?}"),
        }
    }

    #[test]
    fn respects_top_n() {
        let store = FixedStore(vec![
            SpendRecord::new(1, "A", "Tech", "CA", dec!(1)),
            SpendRecord::new(2, "B", "Tech", "CA", dec!(2)),
            SpendRecord::new(3, "C", "Tech", "CA", dec!(3)),
        ]);
        let summary = get_summary(&store, &SummaryConfig { top_n: 1 }).unwrap();
        assert_eq!(summary.top_brands.len(), 1);
        assert_eq!(summary.top_brands[0].brand_name, "C");
        assert_eq!(summary.overall_stats.num_transactions, 3);
    }

    #[test]
    fn huge_amounts_do_not_abort_the_summary() {
        let big = dec!(50000000000000000000000000000);
        let store = FixedStore(vec![
            SpendRecord::new(1, "A", "Tech", "CA", big),
            SpendRecord::new(1, "A", "Tech", "CA", big),
        ]);
        let summary = get_summary(&store, &SummaryConfig::default()).unwrap();
        assert_eq!(summary.overall_stats.num_transactions, 1);
        assert_eq!(summary.overall_stats.total_spend, big);
    }
}
