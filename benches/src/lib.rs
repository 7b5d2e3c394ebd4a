//! Benchmark utilities for tscache.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tscache_lib::{Candle, Fetcher, Granularity};

/// Error type for [`SyntheticSource`]. Never produced.
#[derive(Debug, Error)]
#[error("synthetic source error")]
pub struct SyntheticError;

/// In-memory remote source producing a deterministic candle per slot.
///
/// Every request returns exactly `limit` candles, so every block is full.
#[derive(Debug, Default)]
pub struct SyntheticSource {
    calls: AtomicU64,
}

impl SyntheticSource {
    /// Creates a new source.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            calls: AtomicU64::new(0),
        }
    }

    /// Returns the number of page requests served.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Fetcher<Candle> for SyntheticSource {
    type Error = SyntheticError;

    fn fetch(
        &self,
        _symbol: &str,
        granularity: Granularity,
        start: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Candle>, SyntheticError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let start_ms = start.timestamp_millis();
        let step = granularity.milliseconds() as i64;
        Ok((0..limit as i64)
            .map(|i| {
                let time_ms = start_ms + i * step;
                let price = 100.0 + (time_ms / step % 97) as f64;
                Candle::new(time_ms, price, price + 1.0, price - 1.0, price + 0.5, 10.0)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_synthetic_source_page() {
        let source = SyntheticSource::new();
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

        let page = source.fetch("BTCUSDT", "1m".parse().unwrap(), start, 5).unwrap();

        assert_eq!(page.len(), 5);
        assert_eq!(page[1].time_ms - page[0].time_ms, 60_000);
        assert_eq!(source.calls(), 1);
    }
}
