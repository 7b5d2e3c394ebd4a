//! Timestamp to index arithmetic.
//!
//! Every timestamp maps to a global index along a granularity-specific timeline
//! that starts at a fixed anchor. Global indices are grouped into fixed-size
//! blocks; the anchor and block size together make block boundaries stable
//! across runs and processes.

use chrono::{DateTime, TimeDelta, Utc};

use crate::Granularity;

/// Unix timestamp of the default anchor, 2010-01-01T00:00:00Z.
pub const BASE_DATE_SECS: i64 = 1_262_304_000;

/// Default number of records per block.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Returns the default anchor, 2010-01-01T00:00:00Z.
#[must_use]
pub fn base_date() -> DateTime<Utc> {
    DateTime::from_timestamp(BASE_DATE_SECS, 0).unwrap_or_default()
}

/// Maps timestamps to global indices and global indices to blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexCalculator {
    anchor: DateTime<Utc>,
}

impl Default for IndexCalculator {
    fn default() -> Self {
        Self::new(base_date())
    }
}

impl IndexCalculator {
    /// Creates a calculator anchored at the given time.
    #[must_use]
    pub const fn new(anchor: DateTime<Utc>) -> Self {
        Self { anchor }
    }

    /// Returns the anchor time.
    #[must_use]
    pub const fn anchor(&self) -> DateTime<Utc> {
        self.anchor
    }

    /// Returns `floor((timestamp - anchor) / granularity)`.
    ///
    /// Sub-second precision is discarded. Timestamps before the anchor yield
    /// negative indices.
    #[must_use]
    pub fn to_index(&self, timestamp: DateTime<Utc>, granularity: Granularity) -> i64 {
        let elapsed = timestamp.timestamp() - self.anchor.timestamp();
        elapsed.div_euclid(granularity.seconds() as i64)
    }

    /// Returns `floor(index / block_size)`.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    #[must_use]
    pub const fn to_block_index(index: i64, block_size: usize) -> i64 {
        index.div_euclid(block_size as i64)
    }

    /// Returns the first and last global index covered by a block.
    #[must_use]
    pub const fn block_bounds(block_index: i64, block_size: usize) -> (i64, i64) {
        let size = block_size as i64;
        (block_index * size, (block_index + 1) * size - 1)
    }

    /// Returns the timestamp at which a global index begins.
    ///
    /// Returns `None` if the result is outside the representable range.
    #[must_use]
    pub fn index_time(&self, index: i64, granularity: Granularity) -> Option<DateTime<Utc>> {
        let seconds = index.checked_mul(granularity.seconds() as i64)?;
        self.anchor.checked_add_signed(TimeDelta::try_seconds(seconds)?)
    }

    /// Returns `anchor + block_size * block_index * granularity`.
    ///
    /// Returns `None` if the result is outside the representable range.
    #[must_use]
    pub fn block_start_time(
        &self,
        block_index: i64,
        granularity: Granularity,
        block_size: usize,
    ) -> Option<DateTime<Utc>> {
        let first = block_index.checked_mul(block_size as i64)?;
        self.index_time(first, granularity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn minutes15() -> Granularity {
        "15m".parse().unwrap()
    }

    #[test]
    fn test_base_date() {
        assert_eq!(
            base_date(),
            Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(IndexCalculator::default().anchor(), base_date());
    }

    #[test]
    fn test_to_index() {
        let calc = IndexCalculator::default();
        let g = minutes15();

        assert_eq!(calc.to_index(base_date(), g), 0);
        assert_eq!(calc.to_index(base_date() + TimeDelta::seconds(899), g), 0);
        assert_eq!(calc.to_index(base_date() + TimeDelta::seconds(900), g), 1);

        // 3652 days between 2010-01-01 and 2020-01-01, 96 bars per day
        let t = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(calc.to_index(t, g), 3652 * 96);
    }

    #[test]
    fn test_to_index_before_anchor_is_negative() {
        let calc = IndexCalculator::default();
        let t = base_date() - TimeDelta::seconds(1);
        assert_eq!(calc.to_index(t, minutes15()), -1);
    }

    #[test]
    fn test_to_block_index() {
        assert_eq!(IndexCalculator::to_block_index(0, 4096), 0);
        assert_eq!(IndexCalculator::to_block_index(4095, 4096), 0);
        assert_eq!(IndexCalculator::to_block_index(4096, 4096), 1);
        assert_eq!(IndexCalculator::to_block_index(-1, 4096), -1);
    }

    #[test]
    fn test_block_bounds() {
        assert_eq!(IndexCalculator::block_bounds(0, 4096), (0, 4095));
        assert_eq!(IndexCalculator::block_bounds(2, 10), (20, 29));
    }

    #[test]
    fn test_block_start_time() {
        let calc = IndexCalculator::default();
        let g = minutes15();

        assert_eq!(calc.block_start_time(0, g, 4096), Some(base_date()));
        assert_eq!(
            calc.block_start_time(1, g, 4096),
            Some(base_date() + TimeDelta::seconds(4096 * 900))
        );
        assert_eq!(calc.block_start_time(i64::MAX, g, 4096), None);
    }

    #[test]
    fn test_custom_anchor() {
        let anchor = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let calc = IndexCalculator::new(anchor);
        let g: Granularity = "1h".parse().unwrap();

        assert_eq!(calc.to_index(anchor + TimeDelta::hours(5), g), 5);
        assert_eq!(calc.block_start_time(1, g, 24), Some(anchor + TimeDelta::days(1)));
    }
}
