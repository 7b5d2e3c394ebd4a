//! Query orchestration over blocks.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Range, RangeInclusive};
use std::path::{Path, PathBuf};
use tracing::{Span, debug};
use tscache_store::{BincodeCodec, BlockStore, Codec};
use tscache_types::{BlockKey, Granularity, IndexCalculator, QueryRange, validate_symbol};

use crate::stats::StatsRecorder;
use crate::{
    BlockFetcher, BlockOrigin, CacheConfig, CacheError, CacheStats, FetchedBlock, Fetcher, Result,
    ShortBlockAlignment, spans,
};

/// Summary of a [`Cache::warm`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmReport {
    /// Blocks that were already on disk.
    pub cached: u64,
    /// Blocks fetched from the remote source.
    pub fetched: u64,
    /// Remote page requests issued.
    pub pages: u64,
}

impl WarmReport {
    /// Total number of blocks covered.
    #[must_use]
    pub const fn blocks(&self) -> u64 {
        self.cached + self.fetched
    }
}

/// Disk-backed cache of time-indexed records.
///
/// Queries are answered from fixed-size blocks stored below a base directory.
/// Missing blocks are fetched through the [`Fetcher`] and persisted before
/// being sliced, so a second identical query performs no remote calls.
///
/// All work happens on the calling thread. Concurrent writers to the same
/// directory are not coordinated.
pub struct Cache<R, F, C = BincodeCodec> {
    blocks: BlockFetcher<F, C>,
    stats: StatsRecorder,
    span: Span,
    _record: PhantomData<fn() -> R>,
}

impl<R, F, C: fmt::Debug> fmt::Debug for Cache<R, F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("blocks", &self.blocks)
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}

impl<R, F> Cache<R, F, BincodeCodec>
where
    F: Fetcher<R>,
    R: Serialize + DeserializeOwned,
{
    /// Creates a cache rooted at `basedir` with the given page limit and
    /// default block size.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidConfig`] if `limit` is zero.
    pub fn new(basedir: impl Into<PathBuf>, fetcher: F, limit: usize) -> Result<Self> {
        Self::with_config(basedir, fetcher, CacheConfig::new(limit))
    }

    /// Creates a cache rooted at `basedir` with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidConfig`] if the configuration is invalid.
    pub fn with_config(basedir: impl Into<PathBuf>, fetcher: F, config: CacheConfig) -> Result<Self> {
        Self::with_codec(basedir, fetcher, config, BincodeCodec)
    }
}

impl<R, F, C> Cache<R, F, C>
where
    F: Fetcher<R>,
    R: Serialize + DeserializeOwned,
    C: Codec,
{
    /// Creates a cache that persists blocks with the given codec.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidConfig`] if the configuration is invalid.
    pub fn with_codec(
        basedir: impl Into<PathBuf>,
        fetcher: F,
        config: CacheConfig,
        codec: C,
    ) -> Result<Self> {
        let store = BlockStore::with_codec(basedir, codec);
        Ok(Self {
            blocks: BlockFetcher::new(store, fetcher, config)?,
            stats: StatsRecorder::default(),
            span: Span::none(),
            _record: PhantomData,
        })
    }

    /// Sets the span under which every query and block span is created.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Returns the base directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.blocks.store().root()
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        self.blocks.config()
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &BlockStore<C> {
        self.blocks.store()
    }

    /// Returns the remote fetcher.
    #[must_use]
    pub const fn fetcher(&self) -> &F {
        self.blocks.fetcher()
    }

    /// Returns the index calculator for this cache's anchor.
    #[must_use]
    pub const fn index(&self) -> IndexCalculator {
        self.blocks.config().index()
    }

    /// Returns a snapshot of activity counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Returns records for every index from `start` to `end` inclusive, in
    /// ascending time order.
    ///
    /// `granularity` is a descriptor such as `"15m"`, `"1h"` or `"2d"`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidGranularity`] for a malformed descriptor,
    /// [`CacheError::InvalidRange`] if `start > end`, and any error from
    /// [`query_range`](Self::query_range).
    pub fn query(
        &self,
        symbol: &str,
        granularity: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<R>> {
        let granularity: Granularity = granularity.parse()?;
        let range = QueryRange::new(start, end)?;
        self.query_range(symbol, granularity, &range)
    }

    /// Returns records for every index covered by `range`, in ascending time
    /// order.
    ///
    /// No partial result is returned: an error in any block aborts the query.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidSymbol`] for a symbol that cannot be a
    /// directory name, [`CacheError::BeforeAnchor`] if the range starts before
    /// the anchor, and any error from [`ensure_block`](Self::ensure_block).
    pub fn query_range(
        &self,
        symbol: &str,
        granularity: Granularity,
        range: &QueryRange,
    ) -> Result<Vec<R>> {
        validate_symbol(symbol)?;
        let (start_index, end_index) = self.index_range(granularity, range)?;

        let span = spans::query(&self.span, symbol, granularity, start_index, end_index);
        let _guard = span.enter();

        let block_size = self.config().block_size;
        let start_block = IndexCalculator::to_block_index(start_index, block_size);
        let end_block = IndexCalculator::to_block_index(end_index, block_size);
        let size = block_size as i64;

        let mut result = Vec::new();
        for block_index in start_block..=end_block {
            let key = BlockKey::new(symbol, granularity, block_index);
            let mut block = self.ensure_in(&span, &key)?;

            let local_start = if block_index == start_block {
                start_index.rem_euclid(size) as usize
            } else {
                0
            };
            let local_end = if block_index == end_block {
                end_index.rem_euclid(size) as usize + 1
            } else {
                block_size
            };

            let bounds = slice_bounds(
                block.records.len(),
                block_size,
                local_start,
                local_end,
                self.config().alignment,
            );
            result.extend(block.records.drain(bounds));
        }

        self.stats.record_query();
        debug!(records = result.len(), "Query complete");
        Ok(result)
    }

    /// Returns the inclusive range of block indices covering `range`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::BeforeAnchor`] if the range starts before the
    /// anchor.
    pub fn block_range(
        &self,
        granularity: Granularity,
        range: &QueryRange,
    ) -> Result<RangeInclusive<i64>> {
        let (start_index, end_index) = self.index_range(granularity, range)?;
        let block_size = self.config().block_size;
        Ok(IndexCalculator::to_block_index(start_index, block_size)
            ..=IndexCalculator::to_block_index(end_index, block_size))
    }

    /// Returns the full contents of one block, fetching it if not on disk.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidSymbol`] for an unusable symbol,
    /// [`CacheError::CorruptBlock`] if the block file cannot be decoded,
    /// [`CacheError::Fetch`] if the remote source fails, and
    /// [`CacheError::Store`] on filesystem failures.
    pub fn ensure_block(
        &self,
        symbol: &str,
        granularity: Granularity,
        block_index: i64,
    ) -> Result<FetchedBlock<R>> {
        validate_symbol(symbol)?;
        let key = BlockKey::new(symbol, granularity, block_index);
        self.ensure_in(&self.span, &key)
    }

    /// Ensures every block covering `range` is on disk without slicing or
    /// returning records.
    ///
    /// `on_block` is called after each block with its key and origin.
    ///
    /// # Errors
    ///
    /// Returns the first error from any block; blocks completed before it
    /// stay on disk.
    pub fn warm(
        &self,
        symbol: &str,
        granularity: Granularity,
        range: &QueryRange,
        mut on_block: impl FnMut(&BlockKey, BlockOrigin),
    ) -> Result<WarmReport> {
        validate_symbol(symbol)?;
        let blocks = self.block_range(granularity, range)?;

        let span = spans::warm(
            &self.span,
            symbol,
            granularity,
            *blocks.start(),
            *blocks.end(),
        );
        let _guard = span.enter();

        let mut report = WarmReport::default();
        for block_index in blocks {
            let key = BlockKey::new(symbol, granularity, block_index);
            let block = self.ensure_in(&span, &key)?;
            match block.origin {
                BlockOrigin::Cached => report.cached += 1,
                BlockOrigin::Fetched { pages } => {
                    report.fetched += 1;
                    report.pages += pages;
                }
            }
            on_block(&key, block.origin);
        }

        Ok(report)
    }

    /// Returns the block indices stored on disk for a series, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidSymbol`] for an unusable symbol and
    /// [`CacheError::Store`] if the series directory cannot be read.
    pub fn cached_blocks(&self, symbol: &str, granularity: Granularity) -> Result<Vec<i64>> {
        validate_symbol(symbol)?;
        Ok(self.store().list_blocks(symbol, granularity)?)
    }

    fn index_range(&self, granularity: Granularity, range: &QueryRange) -> Result<(i64, i64)> {
        let index = self.index();
        if range.start < index.anchor() {
            return Err(CacheError::BeforeAnchor {
                timestamp: range.start,
                anchor: index.anchor(),
            });
        }
        Ok((
            index.to_index(range.start, granularity),
            index.to_index(range.end, granularity),
        ))
    }

    fn ensure_in(&self, parent: &Span, key: &BlockKey) -> Result<FetchedBlock<R>> {
        let span = spans::ensure_block(parent, key);
        let _guard = span.enter();

        let block = self.blocks.ensure(key)?;
        match block.origin {
            BlockOrigin::Cached => self.stats.record_hit(),
            BlockOrigin::Fetched { pages } => {
                self.stats.record_miss(pages, block.records.len() as u64);
            }
        }
        Ok(block)
    }
}

/// Returns the range of `block` to keep for local slice bounds
/// `[local_start, local_end)` measured against a full block of `block_size`.
///
/// For a full block the bounds are used as given. For a short block of `len`
/// records, [`ShortBlockAlignment::Start`] shifts both bounds down by
/// `block_size - len` and [`ShortBlockAlignment::End`] leaves them in place.
/// Either way the result is clamped to `0..len`, so bounds falling in the
/// missing part of the block yield fewer records rather than wrapping.
#[must_use]
pub fn slice_bounds(
    len: usize,
    block_size: usize,
    local_start: usize,
    local_end: usize,
    alignment: ShortBlockAlignment,
) -> Range<usize> {
    let (start, end) = match alignment {
        ShortBlockAlignment::Start => {
            let offset = block_size.saturating_sub(len);
            (
                local_start.saturating_sub(offset),
                local_end.saturating_sub(offset),
            )
        }
        ShortBlockAlignment::End => (local_start, local_end),
    };
    let end = end.min(len);
    start.min(end)..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use std::io;
    use tempfile::TempDir;

    fn ok_fetcher(_: &str, g: Granularity, start: DateTime<Utc>, limit: usize) -> io::Result<Vec<i64>> {
        let first = IndexCalculator::default().to_index(start, g);
        Ok((0..limit as i64).map(|i| first + i).collect())
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_slice_bounds_full_block() {
        let align = ShortBlockAlignment::Start;
        assert_eq!(slice_bounds(8, 8, 0, 8, align), 0..8);
        assert_eq!(slice_bounds(8, 8, 3, 5, align), 3..5);
        assert_eq!(slice_bounds(8, 8, 7, 8, align), 7..8);
    }

    #[test]
    fn test_slice_bounds_short_block_start_aligned() {
        let align = ShortBlockAlignment::Start;
        // 5 records, assumed to be slots 3..8.
        assert_eq!(slice_bounds(5, 8, 0, 8, align), 0..5);
        assert_eq!(slice_bounds(5, 8, 4, 6, align), 1..3);
        assert_eq!(slice_bounds(5, 8, 0, 2, align), 0..0);
    }

    #[test]
    fn test_slice_bounds_short_block_end_aligned() {
        let align = ShortBlockAlignment::End;
        // 5 records, assumed to be slots 0..5.
        assert_eq!(slice_bounds(5, 8, 0, 8, align), 0..5);
        assert_eq!(slice_bounds(5, 8, 4, 6, align), 4..5);
        assert_eq!(slice_bounds(5, 8, 6, 8, align), 5..5);
    }

    #[test]
    fn test_slice_bounds_empty_block() {
        assert_eq!(slice_bounds(0, 8, 2, 6, ShortBlockAlignment::Start), 0..0);
        assert_eq!(slice_bounds(0, 8, 2, 6, ShortBlockAlignment::End), 0..0);
    }

    #[test]
    fn test_query_last_slot_of_block() {
        let temp_dir = TempDir::new().unwrap();
        let cache = Cache::with_config(
            temp_dir.path(),
            ok_fetcher,
            CacheConfig::new(4).with_block_size(8),
        )
        .unwrap();
        let g: Granularity = "1h".parse().unwrap();
        let index = cache.index();

        // Index 15 is the last slot of block 1.
        let start = index.index_time(13, g).unwrap();
        let end = index.index_time(15, g).unwrap();
        let records = cache.query("BTCUSDT", "1h", start, end).unwrap();

        assert_eq!(records, vec![13, 14, 15]);
    }

    #[test]
    fn test_query_single_instant() {
        let temp_dir = TempDir::new().unwrap();
        let cache = Cache::new(temp_dir.path(), ok_fetcher, 1000).unwrap();
        let t = at(2020, 1, 1) + TimeDelta::seconds(10);

        let records = cache.query("BTCUSDT", "15m", t, t).unwrap();
        assert_eq!(records, vec![3652 * 96]);
    }

    #[test]
    fn test_block_range() {
        let temp_dir = TempDir::new().unwrap();
        let cache = Cache::new(temp_dir.path(), ok_fetcher, 1000).unwrap();
        let range = QueryRange::new(at(2020, 1, 1), at(2020, 1, 2)).unwrap();

        let blocks = cache.block_range("15m".parse().unwrap(), &range).unwrap();
        assert_eq!(blocks, 85..=85);
    }

    #[test]
    fn test_warm_reports_origins() {
        let temp_dir = TempDir::new().unwrap();
        let cache = Cache::with_config(
            temp_dir.path(),
            ok_fetcher,
            CacheConfig::new(4).with_block_size(8),
        )
        .unwrap();
        let g: Granularity = "1h".parse().unwrap();
        let index = cache.index();
        let range =
            QueryRange::new(index.index_time(0, g).unwrap(), index.index_time(20, g).unwrap())
                .unwrap();

        cache.ensure_block("BTCUSDT", g, 1).unwrap();

        let mut seen = Vec::new();
        let report = cache
            .warm("BTCUSDT", g, &range, |key, origin| {
                seen.push((key.index(), origin.is_cached()));
            })
            .unwrap();

        assert_eq!(seen, vec![(0, false), (1, true), (2, false)]);
        assert_eq!(report.cached, 1);
        assert_eq!(report.fetched, 2);
        assert_eq!(report.pages, 4);
        assert_eq!(report.blocks(), 3);
        assert_eq!(cache.cached_blocks("BTCUSDT", g).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_stats_track_hits_and_misses() {
        let temp_dir = TempDir::new().unwrap();
        let cache = Cache::with_config(
            temp_dir.path(),
            ok_fetcher,
            CacheConfig::new(4).with_block_size(8),
        )
        .unwrap();
        let g: Granularity = "1h".parse().unwrap();
        let index = cache.index();
        let start = index.index_time(2, g).unwrap();
        let end = index.index_time(10, g).unwrap();

        cache.query("X", "1h", start, end).unwrap();
        cache.query("X", "1h", start, end).unwrap();

        let stats = cache.stats();
        assert_eq!(stats.queries, 2);
        assert_eq!(stats.block_misses, 2);
        assert_eq!(stats.block_hits, 2);
        assert_eq!(stats.fetch_calls, 4);
        assert_eq!(stats.records_fetched, 16);
    }

    #[test]
    fn test_rejects_path_unsafe_symbol() {
        let temp_dir = TempDir::new().unwrap();
        let cache = Cache::new(temp_dir.path(), ok_fetcher, 10).unwrap();

        let result = cache.query("../etc", "15m", at(2020, 1, 1), at(2020, 1, 1));
        assert!(matches!(result, Err(CacheError::InvalidSymbol(_))));
        assert!(cache.ensure_block("", "15m".parse().unwrap(), 0).is_err());
    }
}
