//! Klines endpoint URL construction.

use chrono::{DateTime, Utc};
use tscache_types::Granularity;

/// Default API base URL.
pub const BASE_URL: &str = "https://api.binance.com";

/// Path of the klines endpoint below the base URL.
pub const KLINES_PATH: &str = "/api/v3/klines";

/// Maximum number of candles the endpoint returns per request.
pub const MAX_LIMIT: usize = 1000;

/// Intervals accepted by the klines endpoint.
pub const SUPPORTED_INTERVALS: &[&str] = &[
    "1s", "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d",
];

/// Returns the endpoint's interval name for a granularity, if supported.
///
/// # Example
///
/// ```
/// use tscache_fetch::url::interval;
///
/// assert_eq!(interval("15m".parse().unwrap()), Some("15m"));
/// assert_eq!(interval("7m".parse().unwrap()), None);
/// ```
#[must_use]
pub fn interval(granularity: Granularity) -> Option<&'static str> {
    let name = granularity.to_string();
    SUPPORTED_INTERVALS.iter().copied().find(|i| *i == name)
}

/// Builds the URL for one page of candles.
///
/// URL format: `{base}/api/v3/klines?symbol={SYMBOL}&interval={interval}&startTime={ms}&endTime={ms}&limit={limit}`
///
/// `endTime` is inclusive on the server side, so it is set one millisecond
/// before `start + limit * granularity`.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use tscache_fetch::url::klines_url;
///
/// let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
/// let url = klines_url("https://api.binance.com", "btcusdt", "15m", start, "15m".parse().unwrap(), 4);
/// assert_eq!(
///     url,
///     "https://api.binance.com/api/v3/klines?symbol=BTCUSDT&interval=15m&startTime=1577836800000&endTime=1577840399999&limit=4"
/// );
/// ```
#[must_use]
pub fn klines_url(
    base: &str,
    symbol: &str,
    interval: &str,
    start: DateTime<Utc>,
    granularity: Granularity,
    limit: usize,
) -> String {
    let start_ms = start.timestamp_millis();
    let span_ms = (limit as u64).saturating_mul(granularity.milliseconds());
    let end_ms = start_ms.saturating_add(i64::try_from(span_ms).unwrap_or(i64::MAX)) - 1;

    format!(
        "{}{}?symbol={}&interval={}&startTime={}&endTime={}&limit={}",
        base.trim_end_matches('/'),
        KLINES_PATH,
        symbol.to_uppercase(),
        interval,
        start_ms,
        end_ms,
        limit
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_interval_mapping() {
        assert_eq!(interval("1h".parse().unwrap()), Some("1h"));
        assert_eq!(interval("1d".parse().unwrap()), Some("1d"));
        assert_eq!(interval("60m".parse().unwrap()), None);
        assert_eq!(interval("2d".parse().unwrap()), None);
    }

    #[test]
    fn test_klines_url_hourly() {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let url = klines_url(
            "https://example.com/",
            "ethusdt",
            "1h",
            start,
            "1h".parse().unwrap(),
            1000,
        );
        assert_eq!(
            url,
            "https://example.com/api/v3/klines?symbol=ETHUSDT&interval=1h&startTime=1705320000000&endTime=1708919999999&limit=1000"
        );
    }
}
