//! Blocking HTTP fetcher for klines endpoints.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use tscache_core::Fetcher;
use tscache_types::{Candle, Granularity};

use crate::parse::{ParseError, parse_klines};
use crate::url::{self, BASE_URL, MAX_LIMIT};

/// Configuration for the klines fetcher.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retry attempts for failed requests.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds).
    pub max_delay_ms: u64,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 5,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            user_agent: format!("tscache/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Sets the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Errors that can occur while fetching a page of candles.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server kept returning a retryable error status.
    #[error("Server error: {status} after {attempts} attempts")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Number of attempts made.
        attempts: u32,
    },

    /// Server rejected the request.
    #[error("Request rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Response body could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The endpoint has no interval for this granularity.
    #[error("Unsupported interval: {0}")]
    UnsupportedInterval(Granularity),

    /// The page size exceeds what the endpoint serves.
    #[error("Page limit {0} exceeds the endpoint maximum of {MAX_LIMIT}")]
    LimitTooLarge(usize),
}

/// Fetches candle pages from a klines endpoint.
///
/// Retries live here rather than in the cache: a page is retried on
/// timeouts, connection errors, 429 and 5xx responses with exponential
/// backoff, and only the final failure is reported.
#[derive(Debug, Clone)]
pub struct KlinesFetcher {
    client: Client,
    config: ClientConfig,
}

impl KlinesFetcher {
    /// Creates a new fetcher with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .tcp_nodelay(true)
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Creates a fetcher with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(ClientConfig::default())
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Downloads a URL, returning the response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails after all retries.
    pub fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut attempts = 0;

        loop {
            match self.client.get(url).send() {
                Ok(response) => {
                    let status = response.status();
                    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        if attempts < self.config.max_retries {
                            attempts += 1;
                            let delay = self.calculate_backoff_delay(attempts);
                            warn!(%status, attempts, ?delay, "Retrying request");
                            std::thread::sleep(delay);
                            continue;
                        }
                        return Err(FetchError::ServerError {
                            status: status.as_u16(),
                            attempts: attempts + 1,
                        });
                    }

                    if status.is_client_error() {
                        return Err(FetchError::Rejected {
                            status: status.as_u16(),
                            body: response.text().unwrap_or_default(),
                        });
                    }

                    return Ok(response.bytes()?.to_vec());
                }
                Err(e) if self.is_retryable_error(&e) && attempts < self.config.max_retries => {
                    attempts += 1;
                    let delay = self.calculate_backoff_delay(attempts);
                    warn!(error = %e, attempts, ?delay, "Retrying request");
                    std::thread::sleep(delay);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Calculates the backoff delay with exponential backoff and jitter.
    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        let exp_delay = self
            .config
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(10));
        let capped_delay = exp_delay.min(self.config.max_delay_ms);

        // Deterministic jitter within +-25%
        let jitter_range = capped_delay / 4;
        let jitter = if jitter_range > 0 {
            (attempt as u64 * 17) % (jitter_range * 2)
        } else {
            0
        };

        let final_delay = (capped_delay + jitter).saturating_sub(jitter_range).max(100);
        Duration::from_millis(final_delay)
    }

    fn is_retryable_error(&self, error: &reqwest::Error) -> bool {
        if error.is_builder() {
            return false;
        }
        error.is_timeout() || error.is_connect() || error.is_request()
    }
}

impl Fetcher<Candle> for KlinesFetcher {
    type Error = FetchError;

    fn fetch(
        &self,
        symbol: &str,
        granularity: Granularity,
        start: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Candle>, FetchError> {
        if limit > MAX_LIMIT {
            return Err(FetchError::LimitTooLarge(limit));
        }
        let interval =
            url::interval(granularity).ok_or(FetchError::UnsupportedInterval(granularity))?;
        let url = url::klines_url(
            &self.config.base_url,
            symbol,
            interval,
            start,
            granularity,
            limit,
        );

        let body = self.download(&url)?;
        let mut candles = parse_klines(&body)?;

        // Keep the page inside [start, start + limit * granularity)
        let start_ms = start.timestamp_millis();
        let end_ms = start_ms + (limit as u64 * granularity.milliseconds()) as i64;
        candles.retain(|c| c.time_ms >= start_ms && c.time_ms < end_ms);

        debug!(symbol, %start, limit, received = candles.len(), "Fetched klines page");
        Ok(candles)
    }
}
