//! Ensuring a single block is on disk.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{debug, info, warn};
use tscache_store::{BincodeCodec, BlockStore, Codec};
use tscache_types::BlockKey;

use crate::{CacheConfig, CacheError, Fetcher, Result};

/// Where the records of an ensured block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOrigin {
    /// Loaded from an existing block file.
    Cached,
    /// Fetched from the remote source and persisted.
    Fetched {
        /// Number of remote page requests issued.
        pages: u64,
    },
}

impl BlockOrigin {
    /// Returns true if the block was already on disk.
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        matches!(self, Self::Cached)
    }
}

/// The full contents of one block, not yet sliced to any query bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedBlock<R> {
    /// Records in ascending time order. At most `block_size` of them.
    pub records: Vec<R>,
    /// Where the records came from.
    pub origin: BlockOrigin,
}

/// Makes blocks available on disk, fetching them page by page when missing.
///
/// A block that is not on disk is fetched in strides of at most `limit`
/// records starting at the block's start time, accumulated in memory and
/// written in one piece. A fetch error therefore leaves no partial block
/// behind. Blocks that come back short (remote history exhausted) are
/// persisted as they are and never re-fetched.
pub struct BlockFetcher<F, C = BincodeCodec> {
    store: BlockStore<C>,
    fetcher: F,
    config: CacheConfig,
}

impl<F, C: fmt::Debug> fmt::Debug for BlockFetcher<F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockFetcher")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<F, C: Codec> BlockFetcher<F, C> {
    /// Creates a block fetcher over an existing store.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidConfig`] if the configuration is invalid.
    pub fn new(store: BlockStore<C>, fetcher: F, config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            fetcher,
            config,
        })
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &BlockStore<C> {
        &self.store
    }

    /// Returns the remote fetcher.
    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the full contents of a block, fetching and persisting it first
    /// if it is not on disk.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::CorruptBlock`] if an existing block file cannot be
    /// decoded, [`CacheError::Fetch`] if any page request fails,
    /// [`CacheError::IndexOverflow`] if the block lies outside the representable
    /// time range, and [`CacheError::Store`] on filesystem failures.
    pub fn ensure<R>(&self, key: &BlockKey) -> Result<FetchedBlock<R>>
    where
        F: Fetcher<R>,
        R: Serialize + DeserializeOwned,
    {
        let path = self.store.block_path(key);

        if self.store.exists(&path) {
            let records = self.store.load(&path)?;
            debug!(block = %key, records = records.len(), "Block cache hit");
            return Ok(FetchedBlock {
                records,
                origin: BlockOrigin::Cached,
            });
        }

        let (records, pages) = self.fetch_block(key)?;
        self.store.save(&path, &records)?;

        if records.len() < self.config.block_size {
            warn!(
                block = %key,
                records = records.len(),
                block_size = self.config.block_size,
                "Persisted short block, remote history exhausted"
            );
        }
        info!(block = %key, records = records.len(), pages, "Fetched block");

        Ok(FetchedBlock {
            records,
            origin: BlockOrigin::Fetched { pages },
        })
    }

    fn fetch_block<R>(&self, key: &BlockKey) -> Result<(Vec<R>, u64)>
    where
        F: Fetcher<R>,
    {
        let block_size = self.config.block_size;
        let limit = self.config.limit;
        let index = self.config.index();
        let granularity = key.granularity();
        let first = key
            .index()
            .checked_mul(block_size as i64)
            .ok_or_else(|| CacheError::IndexOverflow(key.clone()))?;

        let mut records = Vec::with_capacity(block_size);
        let mut requested = 0usize;
        let mut pages = 0u64;

        while requested < block_size {
            let page_limit = (block_size - requested).min(limit);
            let start = first
                .checked_add(requested as i64)
                .and_then(|i| index.index_time(i, granularity))
                .ok_or_else(|| CacheError::IndexOverflow(key.clone()))?;

            let mut page = self
                .fetcher
                .fetch(key.symbol(), granularity, start, page_limit)
                .map_err(|e| CacheError::Fetch {
                    key: key.clone(),
                    start,
                    source: Box::new(e),
                })?;
            pages += 1;

            if page.len() > page_limit {
                warn!(
                    block = %key,
                    received = page.len(),
                    page_limit,
                    "Fetcher returned more records than requested, truncating"
                );
                page.truncate(page_limit);
            }
            debug!(
                block = %key,
                %start,
                page_limit,
                received = page.len(),
                "Fetched page"
            );

            records.append(&mut page);
            requested += page_limit;
        }

        Ok((records, pages))
    }
}
