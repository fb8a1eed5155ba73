//! Summary assembly: turns aggregation state into the five output views.

use super::aggregation::{Aggregation, BrandTotals};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryConfig {
    pub top_n: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spend: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub avg_transaction_amount: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub max_spend: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub min_spend: Option<Decimal>,
    pub num_transactions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandAggregate {
    #[serde(skip)]
    pub brand_id: i64,
    pub brand_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spend: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_spend: Decimal,
    pub num_transactions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustrySpend {
    pub industry_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spend: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSpend {
    pub state_abbr: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spend: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryTxCount {
    pub industry_name: String,
    pub transaction_count: u64,
}

/// All derived views for one record snapshot. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub overall_stats: OverallStats,
    pub top_brands: Vec<BrandAggregate>,
    pub spend_by_industry: Vec<IndustrySpend>,
    pub spend_by_state: Vec<StateSpend>,
    pub tx_count_by_industry: Vec<IndustryTxCount>,
}

impl Summary {
    pub fn assemble(agg: &Aggregation, config: &SummaryConfig) -> Self {
        let overall = &agg.overall;
        let overall_stats = OverallStats {
            total_spend: overall.totals.sum,
            avg_transaction_amount: overall.totals.average(),
            max_spend: overall.max,
            min_spend: overall.min,
            num_transactions: overall.totals.count,
        };

        let brands = brand_aggregates(agg);
        let top_brands = rank_top_brands(brands, config.top_n);

        // BTreeMap iteration is already ascending by key.
        let spend_by_industry = agg
            .by_industry
            .iter()
            .map(|(name, t)| IndustrySpend {
                industry_name: name.clone(),
                total_spend: t.sum,
            })
            .collect();
        let spend_by_state = agg
            .by_state
            .iter()
            .map(|(abbr, t)| StateSpend {
                state_abbr: abbr.clone(),
                total_spend: t.sum,
            })
            .collect();
        let tx_count_by_industry = agg
            .by_industry
            .iter()
            .map(|(name, t)| IndustryTxCount {
                industry_name: name.clone(),
                transaction_count: t.count,
            })
            .collect();

        Summary {
            overall_stats,
            top_brands,
            spend_by_industry,
            spend_by_state,
            tx_count_by_industry,
        }
    }

    /// Shape returned for an empty record store.
    pub fn empty() -> Self {
        Self::assemble(&Aggregation::default(), &SummaryConfig::default())
    }
}

/// Every brand's aggregate, unranked.
pub fn brand_aggregates(agg: &Aggregation) -> Vec<BrandAggregate> {
    agg.by_brand
        .iter()
        .map(|(&brand_id, b)| to_brand_aggregate(brand_id, b))
        .collect()
}

fn to_brand_aggregate(brand_id: i64, brand: &BrandTotals) -> BrandAggregate {
    BrandAggregate {
        brand_id,
        brand_name: brand.brand_name.clone(),
        total_spend: brand.totals.sum,
        avg_spend: brand.totals.average().unwrap_or_default(),
        num_transactions: brand.totals.count,
    }
}

/// Rank by total spend descending, then name ascending, then id; keep `top_n`.
pub fn rank_top_brands(mut brands: Vec<BrandAggregate>, top_n: usize) -> Vec<BrandAggregate> {
    brands.sort_by(compare_brands);
    brands.truncate(top_n);
    brands
}

fn compare_brands(a: &BrandAggregate, b: &BrandAggregate) -> Ordering {
    b.total_spend
        .cmp(&a.total_spend)
        .then_with(|| a.brand_name.cmp(&b.brand_name))
        .then_with(|| a.brand_id.cmp(&b.brand_id))
}
