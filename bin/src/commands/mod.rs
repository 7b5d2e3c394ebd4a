//! CLI command implementations.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tscache_lib::prelude::*;

use crate::display::Alignment;

pub(crate) mod blocks;
pub(crate) mod index;
pub(crate) mod query;
pub(crate) mod warm;

/// Options shared by every command that opens the cache.
pub(crate) struct CacheOptions {
    pub(crate) cache_dir: PathBuf,
    pub(crate) base_url: Option<String>,
    pub(crate) limit: usize,
    pub(crate) alignment: Alignment,
}

impl CacheOptions {
    /// Cache configuration for these options.
    pub(crate) fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.limit).with_alignment(self.alignment.into())
    }
}

/// Opens the candle cache backed by the klines HTTP fetcher.
pub(crate) fn open_cache(options: &CacheOptions) -> Result<Cache<Candle, KlinesFetcher>> {
    let mut config = ClientConfig::default();
    if let Some(base_url) = &options.base_url {
        config = config.with_base_url(base_url.clone());
    }
    let fetcher = KlinesFetcher::new(config).context("Failed to create HTTP client")?;

    let span = tracing::info_span!("tscache", cache_dir = %options.cache_dir.display());
    let cache = Cache::with_config(options.cache_dir.clone(), fetcher, options.cache_config())
        .context("Invalid cache configuration")?
        .with_span(span);
    Ok(cache)
}
