//! Cache configuration.

use chrono::{DateTime, Utc};
use tscache_types::{DEFAULT_BLOCK_SIZE, IndexCalculator, base_date};

use crate::{CacheError, Result};

/// Where a block shorter than `block_size` is assumed to be missing records.
///
/// A block comes back short when the remote source has no data for part of
/// its span. Records carry no position of their own, so the slicer has to
/// assume which end is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShortBlockAlignment {
    /// Records are missing at the start of the block (history begins inside
    /// it). Slice bounds are shifted down by `block_size - len`.
    #[default]
    Start,
    /// Records are missing at the end of the block (history stops inside
    /// it). Slice bounds are used as-is and clamped to the block length.
    End,
}

/// Configuration for a [`Cache`](crate::Cache).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum records per remote call.
    pub limit: usize,
    /// Records per block.
    pub block_size: usize,
    /// Anchor time from which global indices are counted.
    pub anchor: DateTime<Utc>,
    /// Short block slicing policy.
    pub alignment: ShortBlockAlignment,
}

impl CacheConfig {
    /// Creates a configuration with the given page limit and defaults for
    /// everything else (4096-record blocks anchored at 2010-01-01 UTC).
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            block_size: DEFAULT_BLOCK_SIZE,
            anchor: base_date(),
            alignment: ShortBlockAlignment::Start,
        }
    }

    /// Sets the block size.
    #[must_use]
    pub const fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Sets the anchor time.
    ///
    /// Changing the anchor of an existing cache directory changes every block
    /// boundary; use a fresh directory.
    #[must_use]
    pub const fn with_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = anchor;
        self
    }

    /// Sets the short block slicing policy.
    #[must_use]
    pub const fn with_alignment(mut self, alignment: ShortBlockAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Returns the index calculator for this configuration's anchor.
    #[must_use]
    pub const fn index(&self) -> IndexCalculator {
        IndexCalculator::new(self.anchor)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidConfig`] if the limit or block size is zero,
    /// or the block size does not fit a signed 64-bit index.
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(CacheError::InvalidConfig("limit must be positive".into()));
        }
        if self.block_size == 0 {
            return Err(CacheError::InvalidConfig(
                "block_size must be positive".into(),
            ));
        }
        if i64::try_from(self.block_size).is_err() {
            return Err(CacheError::InvalidConfig(format!(
                "block_size {} is too large",
                self.block_size
            )));
        }
        Ok(())
    }
}
