//! Aggregation engine: grouped sums, counts and extrema over spend records.
//!
//! One pass over the records fills every accumulator. All reducers are exact
//! (decimal sum, integer count, min, max), so the result does not depend on
//! the order the records arrive in. Averages are derived after the pass.

use super::record::{Amount, SpendRecord};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Running sum and count for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpendTotals {
    pub sum: Decimal,
    pub count: u64,
}

impl SpendTotals {
    /// Totals with `amount` added, or `None` if the sum would overflow.
    fn checked_add(&self, amount: Decimal) -> Option<Self> {
        Some(Self {
            sum: self.sum.checked_add(amount)?,
            count: self.count + 1,
        })
    }

    /// `sum / count`, or `None` for an empty group.
    pub fn average(&self) -> Option<Decimal> {
        if self.count == 0 {
            return None;
        }
        self.sum.checked_div(Decimal::from(self.count))
    }
}

/// Totals for the whole record set, with extrema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverallTotals {
    pub totals: SpendTotals,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl OverallTotals {
    fn apply(&mut self, totals: SpendTotals, amount: Decimal) {
        self.totals = totals;
        self.min = Some(self.min.map_or(amount, |m| m.min(amount)));
        self.max = Some(self.max.map_or(amount, |m| m.max(amount)));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandTotals {
    pub brand_name: String,
    pub totals: SpendTotals,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueReason {
    MissingAmount,
    MalformedAmount(String),
    SumOverflow(Decimal),
    ConflictingBrandName { kept: String, other: String },
}

impl std::fmt::Display for IssueReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueReason::MissingAmount => write!(f, "missing amount"),
            IssueReason::MalformedAmount(raw) => write!(f, "malformed amount {raw:?}"),
            IssueReason::SumOverflow(amount) => write!(f, "amount {amount} overflows a total"),
            IssueReason::ConflictingBrandName { kept, other } => {
                write!(f, "brand name {other:?} conflicts with {kept:?}")
            }
        }
    }
}

/// A record-level problem that did not stop aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataQualityIssue {
    pub brand_id: i64,
    pub reason: IssueReason,
}

/// Accumulator state after one pass over a record snapshot.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub overall: OverallTotals,
    pub by_brand: HashMap<i64, BrandTotals>,
    pub by_industry: BTreeMap<String, SpendTotals>,
    pub by_state: BTreeMap<String, SpendTotals>,
    pub issues: Vec<DataQualityIssue>,
}

impl Aggregation {
    pub fn compute(records: &[SpendRecord]) -> Self {
        let mut agg = Aggregation::default();
        for record in records {
            agg.add(record);
        }
        agg
    }

    fn add(&mut self, record: &SpendRecord) {
        let amount = match &record.amount {
            Amount::Valid(d) => *d,
            Amount::Missing => {
                self.flag(record.brand_id, IssueReason::MissingAmount);
                return;
            }
            Amount::Malformed(raw) => {
                self.flag(record.brand_id, IssueReason::MalformedAmount(raw.clone()));
                return;
            }
        };

        // Every group total must accept the amount, or the record counts nowhere.
        let brand_before = self
            .by_brand
            .get(&record.brand_id)
            .map(|b| b.totals)
            .unwrap_or_default();
        let industry_before = self
            .by_industry
            .get(&record.industry_name)
            .copied()
            .unwrap_or_default();
        let state_before = self
            .by_state
            .get(&record.state_abbr)
            .copied()
            .unwrap_or_default();
        let updated = (
            self.overall.totals.checked_add(amount),
            brand_before.checked_add(amount),
            industry_before.checked_add(amount),
            state_before.checked_add(amount),
        );
        let (Some(overall), Some(brand_totals), Some(industry), Some(state)) = updated else {
            self.flag(record.brand_id, IssueReason::SumOverflow(amount));
            return;
        };

        self.overall.apply(overall, amount);
        self.by_industry.insert(record.industry_name.clone(), industry);
        self.by_state.insert(record.state_abbr.clone(), state);

        let conflict = match self.by_brand.get_mut(&record.brand_id) {
            Some(brand) => {
                brand.totals = brand_totals;
                // Keep the smallest name so the choice is independent of record order.
                if brand.brand_name != record.brand_name {
                    let (kept, other) = if record.brand_name < brand.brand_name {
                        let previous =
                            std::mem::replace(&mut brand.brand_name, record.brand_name.clone());
                        (record.brand_name.clone(), previous)
                    } else {
                        (brand.brand_name.clone(), record.brand_name.clone())
                    };
                    Some(IssueReason::ConflictingBrandName { kept, other })
                } else {
                    None
                }
            }
            None => {
                self.by_brand.insert(
                    record.brand_id,
                    BrandTotals {
                        brand_name: record.brand_name.clone(),
                        totals: brand_totals,
                    },
                );
                None
            }
        };
        if let Some(reason) = conflict {
            self.flag(record.brand_id, reason);
        }
    }

    fn flag(&mut self, brand_id: i64, reason: IssueReason) {
        tracing::warn!(brand_id, %reason, "excluding record from summary");
        self.issues.push(DataQualityIssue { brand_id, reason });
    }

    /// Records that contributed to the totals.
    pub fn num_transactions(&self) -> u64 {
        self.overall.totals.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn rec(id: i64, name: &str, industry: &str, state: &str, amount: Decimal) -> SpendRecord {
        SpendRecord::new(id, name, industry, state, amount)
    }

    #[test]
    fn empty_input_has_no_extrema() {
        let agg = Aggregation::compute(&[]);
        assert_eq!(agg.num_transactions(), 0);
        assert_eq!(agg.overall.totals.sum, Decimal::ZERO);
        assert_eq!(agg.overall.min, None);
        assert_eq!(agg.overall.max, None);
        assert_eq!(agg.overall.totals.average(), None);
        assert!(agg.by_brand.is_empty());
        assert!(agg.by_industry.is_empty());
        assert!(agg.by_state.is_empty());
    }

    #[test]
    fn groups_by_brand_industry_and_state() {
        let records = vec![
            rec(1, "Acme", "Tech", "CA", dec!(10)),
            rec(1, "Acme", "Tech", "NY", dec!(20)),
            rec(2, "Bolt", "Retail", "CA", dec!(5)),
        ];
        let agg = Aggregation::compute(&records);

        assert_eq!(agg.num_transactions(), 3);
        assert_eq!(agg.overall.totals.sum, dec!(35));
        assert_eq!(agg.overall.min, Some(dec!(5)));
        assert_eq!(agg.overall.max, Some(dec!(20)));

        let acme = &agg.by_brand[&1];
        assert_eq!(acme.brand_name, "Acme");
        assert_eq!(acme.totals, SpendTotals { sum: dec!(30), count: 2 });
        assert_eq!(acme.totals.average(), Some(dec!(15)));

        assert_eq!(agg.by_industry["Tech"].sum, dec!(30));
        assert_eq!(agg.by_industry["Retail"].count, 1);
        assert_eq!(agg.by_state["CA"].sum, dec!(15));
        assert_eq!(agg.by_state["NY"].sum, dec!(20));
    }

    #[test]
    fn bad_amounts_are_excluded_and_reported() {
        let records = vec![
            rec(1, "Acme", "Tech", "CA", dec!(10)),
            SpendRecord::new(2, "Bolt", "Retail", "TX", Amount::Missing),
            SpendRecord::new(3, "Core", "Retail", "TX", Amount::Malformed("n/a".into())),
        ];
        let agg = Aggregation::compute(&records);

        assert_eq!(agg.num_transactions(), 1);
        assert_eq!(agg.overall.totals.sum, dec!(10));
        assert!(!agg.by_brand.contains_key(&2));
        assert!(!agg.by_industry.contains_key("Retail"));
        assert_eq!(
            agg.issues,
            vec![
                DataQualityIssue {
                    brand_id: 2,
                    reason: IssueReason::MissingAmount
                },
                DataQualityIssue {
                    brand_id: 3,
                    reason: IssueReason::MalformedAmount("n/a".into())
                },
            ]
        );
    }

    #[test]
    fn negative_amounts_are_aggregated_as_given() {
        let records = vec![
            rec(1, "Acme", "Tech", "CA", dec!(10)),
            rec(1, "Acme", "Tech", "CA", dec!(-4)),
        ];
        let agg = Aggregation::compute(&records);
        assert_eq!(agg.overall.totals.sum, dec!(6));
        assert_eq!(agg.overall.min, Some(dec!(-4)));
        assert!(agg.issues.is_empty());
    }

    #[test]
    fn conflicting_brand_names_keep_smallest() {
        let forward = vec![
            rec(7, "Zeta", "Tech", "CA", dec!(1)),
            rec(7, "Alpha", "Tech", "CA", dec!(1)),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        for records in [forward, backward] {
            let agg = Aggregation::compute(&records);
            assert_eq!(agg.by_brand[&7].brand_name, "Alpha");
            assert_eq!(agg.by_brand[&7].totals.count, 2);
            assert_eq!(agg.issues.len(), 1);
        }
    }

    #[test]
    fn decimal_sums_are_exact() {
        // 0.1 + 0.2 is not 0.3 in binary floating point.
        let records = vec![
            rec(1, "Acme", "Tech", "CA", dec!(0.1)),
            rec(1, "Acme", "Tech", "CA", dec!(0.2)),
        ];
        let agg = Aggregation::compute(&records);
        assert_eq!(agg.overall.totals.sum, dec!(0.3));
    }

    #[test]
    fn overflowing_record_is_excluded_everywhere() {
        let big = dec!(50000000000000000000000000000);
        let records = vec![
            rec(1, "Acme", "Tech", "CA", big),
            rec(2, "Bolt", "Media", "NY", big),
            rec(3, "Core", "Retail", "TX", dec!(1)),
        ];
        let agg = Aggregation::compute(&records);

        assert_eq!(agg.num_transactions(), 2);
        assert_eq!(agg.overall.totals.sum, big + dec!(1));
        assert_eq!(agg.overall.max, Some(big));
        assert!(!agg.by_brand.contains_key(&2));
        assert!(!agg.by_industry.contains_key("Media"));
        assert!(!agg.by_state.contains_key("NY"));
        assert_eq!(
            agg.issues,
            vec![DataQualityIssue {
                brand_id: 2,
                reason: IssueReason::SumOverflow(big),
            }]
        );
    }

    #[test]
    fn group_overflow_leaves_other_totals_untouched() {
        // The overall sum fits, but the Acme group alone would overflow.
        let big = dec!(50000000000000000000000000000);
        let records = vec![
            rec(1, "Acme", "Tech", "CA", big),
            rec(2, "Bolt", "Media", "NY", -big),
            rec(1, "Acme", "Tech", "CA", big),
        ];
        let agg = Aggregation::compute(&records);

        assert_eq!(agg.num_transactions(), 2);
        assert_eq!(agg.overall.totals.sum, Decimal::ZERO);
        assert_eq!(agg.by_brand[&1].totals.count, 1);
        assert_eq!(agg.by_industry["Tech"].sum, big);
        assert_eq!(agg.issues.len(), 1);
    }
}
