//! Remote page retrieval capability.

use chrono::{DateTime, Utc};
use tscache_types::Granularity;

/// Retrieves one page of records from a remote source.
///
/// Implementations return records sorted ascending by time, at most `limit`
/// of them, starting at `start`. A short or empty page means the source has
/// no more data at that point. Retries, backoff and rate limiting are the
/// implementation's business; the cache calls each page exactly once.
///
/// Any closure with the matching signature is a fetcher:
///
/// ```
/// use chrono::{DateTime, Utc};
/// use tscache_core::Fetcher;
/// use tscache_types::Granularity;
///
/// let fetcher = |_symbol: &str, _g: Granularity, _start: DateTime<Utc>, limit: usize| {
///     Ok::<_, std::io::Error>(vec![0u32; limit])
/// };
/// let page = fetcher.fetch("BTCUSDT", "1m".parse().unwrap(), Utc::now(), 3).unwrap();
/// assert_eq!(page.len(), 3);
/// ```
pub trait Fetcher<R> {
    /// Error returned by the remote source.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches up to `limit` records for `symbol` starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote source cannot be reached or rejects the
    /// request.
    fn fetch(
        &self,
        symbol: &str,
        granularity: Granularity,
        start: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<R>, Self::Error>;
}

impl<R, E, F> Fetcher<R> for F
where
    F: Fn(&str, Granularity, DateTime<Utc>, usize) -> Result<Vec<R>, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn fetch(
        &self,
        symbol: &str,
        granularity: Granularity,
        start: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<R>, E> {
        self(symbol, granularity, start, limit)
    }
}
