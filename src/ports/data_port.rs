//! Record store port trait.

use crate::domain::error::BrandspendError;
use crate::domain::record::{Brand, DailySpend, SpendRecord};

/// Read access to the transaction records behind every view.
///
/// `snapshot` must return one consistent point-in-time view of the store:
/// concurrent writers may not leave a call with a mix of old and new rows.
pub trait DataPort {
    fn snapshot(&self) -> Result<Vec<SpendRecord>, BrandspendError>;

    /// Brands ordered by `brand_id`, at most `limit` rows.
    fn list_brands(&self, limit: usize) -> Result<Vec<Brand>, BrandspendError>;

    /// Transactions ordered by date then `brand_id`, at most `limit` rows.
    fn list_daily_spend(&self, limit: usize) -> Result<Vec<DailySpend>, BrandspendError>;
}
