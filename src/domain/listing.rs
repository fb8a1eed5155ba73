//! Limit policy for the brand and daily-spend listings.

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl ListingConfig {
    /// Resolve a caller-supplied limit into `1..=max_limit`.
    pub fn clamp(&self, requested: Option<i64>) -> usize {
        match requested {
            None => self.default_limit.clamp(1, self.max_limit.max(1)),
            Some(n) if n < 1 => 1,
            Some(n) => usize::try_from(n)
                .unwrap_or(usize::MAX)
                .min(self.max_limit.max(1)),
        }
    }
}
