//! Disk-backed block cache for paginated time-series sources.
//!
//! This is a facade crate that re-exports functionality from the tscache
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use tscache_lib::prelude::*;
//! use chrono::{TimeZone, Utc};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = KlinesFetcher::with_defaults()?;
//!     let cache = Cache::new("./cache", fetcher, 1000)?;
//!
//!     let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
//!     let end = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
//!     let candles = cache.query("BTCUSDT", "15m", start, end)?;
//!
//!     write_candles(OutputFormat::Csv, &candles, std::io::stdout().lock())?;
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use tscache_types::*;

// Re-export persistence
pub use tscache_store::{BincodeCodec, BlockStore, Codec, CodecError, JsonCodec, StoreError};

// Re-export the cache engine
pub use tscache_core::{
    BlockFetcher, BlockOrigin, Cache, CacheConfig, CacheError, CacheStats, FetchedBlock, Fetcher,
    ShortBlockAlignment, WarmReport, slice_bounds,
};

// Re-export the HTTP adapter
#[cfg(feature = "fetch")]
pub use tscache_fetch::{ClientConfig, FetchError, KlinesFetcher, ParseError, parse_klines};

// Re-export formatters
#[cfg(feature = "format")]
pub use tscache_format::{
    CsvFormatter, FormatError, Formatter, JsonFormatter, OutputFormat, write_candles,
};

/// Prelude module for convenient imports.
///
/// ```
/// use tscache_lib::prelude::*;
/// ```
pub mod prelude {
    pub use tscache_types::{Candle, Granularity, IndexCalculator, QueryRange};

    pub use tscache_core::{
        Cache, CacheConfig, CacheError, CacheStats, Fetcher, ShortBlockAlignment, WarmReport,
    };

    #[cfg(feature = "fetch")]
    pub use tscache_fetch::{ClientConfig, KlinesFetcher};

    #[cfg(feature = "format")]
    pub use tscache_format::{Formatter, OutputFormat, write_candles};
}
