//! Error types for cache operations.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;
use tscache_store::{CodecError, StoreError};
use tscache_types::{BlockKey, GranularityParseError, RangeError, SymbolError};

/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors that can occur while answering a query.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The granularity string is malformed.
    #[error(transparent)]
    InvalidGranularity(#[from] GranularityParseError),

    /// The query range is inverted.
    #[error(transparent)]
    InvalidRange(#[from] RangeError),

    /// The symbol cannot be used as a directory name.
    #[error(transparent)]
    InvalidSymbol(#[from] SymbolError),

    /// The query starts before the anchor time.
    #[error("Query start {timestamp} is before the cache anchor {anchor}")]
    BeforeAnchor {
        /// The offending timestamp.
        timestamp: DateTime<Utc>,
        /// The configured anchor.
        anchor: DateTime<Utc>,
    },

    /// The configuration is unusable.
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),

    /// A block's time span does not fit the supported time range.
    #[error("Block {0} is outside the representable time range")]
    IndexOverflow(BlockKey),

    /// A persisted block could not be decoded.
    #[error("Corrupt block file '{path}': {source}")]
    CorruptBlock {
        /// The block path.
        path: PathBuf,
        /// The decoding error.
        source: CodecError,
    },

    /// A filesystem operation failed.
    #[error(transparent)]
    Store(StoreError),

    /// The remote fetcher failed.
    #[error("Fetch failed for block {key} at {start}: {source}")]
    Fetch {
        /// The block being fetched.
        key: BlockKey,
        /// Start time of the failed page.
        start: DateTime<Utc>,
        /// The fetcher's error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<StoreError> for CacheError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CorruptBlock { path, source } => Self::CorruptBlock { path, source },
            other => Self::Store(other),
        }
    }
}

impl CacheError {
    /// Returns true if the error came from the remote fetcher.
    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}
