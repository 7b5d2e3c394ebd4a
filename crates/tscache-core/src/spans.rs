//! Span constructors for cache operations.
//!
//! Business code creates its span through one of these helpers and enters it,
//! rather than carrying `#[instrument]` attributes:
//!
//! ```rust,ignore
//! let span = spans::query(&self.span, symbol, granularity, start_index, end_index);
//! let _guard = span.enter();
//! ```

use tracing::Span;
use tscache_types::{BlockKey, Granularity};

/// Create span for a range query.
///
/// Parent: the span injected through `Cache::with_span`
/// Children: `ensure_block` spans (one per covered block)
#[inline]
pub(crate) fn query(
    parent: &Span,
    symbol: &str,
    granularity: Granularity,
    start_index: i64,
    end_index: i64,
) -> Span {
    tracing::info_span!(
        parent: parent,
        "tscache.query",
        symbol = symbol,
        granularity = %granularity,
        start_index = start_index,
        end_index = end_index,
    )
}

/// Create span for warming a block range.
///
/// Parent: the span injected through `Cache::with_span`
/// Children: `ensure_block` spans
#[inline]
pub(crate) fn warm(
    parent: &Span,
    symbol: &str,
    granularity: Granularity,
    start_block: i64,
    end_block: i64,
) -> Span {
    tracing::info_span!(
        parent: parent,
        "tscache.warm",
        symbol = symbol,
        granularity = %granularity,
        start_block = start_block,
        end_block = end_block,
    )
}

/// Create span for ensuring a single block is on disk.
///
/// Parent: `query` or `warm` when called from them, otherwise the injected span
/// Children: none (page fetches are logged as events)
#[inline]
pub(crate) fn ensure_block(parent: &Span, key: &BlockKey) -> Span {
    tracing::debug_span!(
        parent: parent,
        "tscache.ensure_block",
        block = %key,
    )
}
