//! OHLCV candle record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar (candlestick) as returned by exchange kline endpoints.
///
/// The cache itself never looks inside a record; this type is what the
/// bundled HTTP adapter produces and the formatters consume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time in milliseconds since the Unix epoch.
    pub time_ms: i64,
    /// Opening price.
    pub open: f64,
    /// Highest price during the period.
    pub high: f64,
    /// Lowest price during the period.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume in base units.
    pub volume: f64,
}

impl Candle {
    /// Creates a new candle.
    #[must_use]
    pub const fn new(
        time_ms: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            time_ms,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns the bar open time, or `None` if out of range.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time_ms)
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns true if the bar closed above its open.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_candle_timestamp() {
        let candle = Candle::new(1_577_836_800_000, 1.0, 2.0, 0.5, 1.5, 10.0);
        assert_eq!(
            candle.timestamp(),
            Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_candle_range() {
        let candle = Candle::new(0, 100.0, 110.0, 95.0, 105.0, 1.0);
        assert!((candle.range() - 15.0).abs() < 1e-10);
        assert!(candle.is_bullish());
    }
}
