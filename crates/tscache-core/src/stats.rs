//! Cache activity counters.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a cache's activity since it was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of completed `query` calls.
    pub queries: u64,
    /// Blocks served from disk.
    pub block_hits: u64,
    /// Blocks fetched from the remote source.
    pub block_misses: u64,
    /// Remote page requests issued.
    pub fetch_calls: u64,
    /// Records received from the remote source.
    pub records_fetched: u64,
}

impl CacheStats {
    /// Fraction of blocks served from disk, or `None` before any block was touched.
    #[must_use]
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.block_hits + self.block_misses;
        if total == 0 {
            return None;
        }
        Some(self.block_hits as f64 / total as f64)
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} queries, {} block hits, {} block misses, {} fetch calls, {} records fetched",
            self.queries, self.block_hits, self.block_misses, self.fetch_calls, self.records_fetched
        )?;
        if let Some(rate) = self.hit_rate() {
            write!(f, " ({:.1}% hit rate)", rate * 100.0)?;
        }
        Ok(())
    }
}

/// Shared counters behind [`CacheStats`].
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    queries: AtomicU64,
    block_hits: AtomicU64,
    block_misses: AtomicU64,
    fetch_calls: AtomicU64,
    records_fetched: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hit(&self) {
        self.block_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self, pages: u64, records: u64) {
        self.block_misses.fetch_add(1, Ordering::Relaxed);
        self.fetch_calls.fetch_add(pages, Ordering::Relaxed);
        self.records_fetched.fetch_add(records, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            queries: self.queries.load(Ordering::Relaxed),
            block_hits: self.block_hits.load(Ordering::Relaxed),
            block_misses: self.block_misses.load(Ordering::Relaxed),
            fetch_calls: self.fetch_calls.load(Ordering::Relaxed),
            records_fetched: self.records_fetched.load(Ordering::Relaxed),
        }
    }
}
