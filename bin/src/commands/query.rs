//! Query command implementation.
//!
//! This module answers a range query from the cache, fetching any missing
//! blocks, and writes the candles in the requested format.

use super::{CacheOptions, open_cache};
use crate::display::{Format, parse_end, parse_time, write_output};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

/// Query candles for a symbol and write them to a file or stdout.
pub(crate) fn query(
    options: &CacheOptions,
    symbol: &str,
    granularity: &str,
    start_str: &str,
    end_str: Option<&str>,
    output: Option<PathBuf>,
    format: Format,
) -> Result<()> {
    let start = parse_time(start_str)?;
    let end = parse_end(end_str)?;
    let cache = open_cache(options)?;

    let candles = cache
        .query(symbol, granularity, start, end)
        .with_context(|| format!("Query failed for {symbol} {granularity}"))?;

    write_output(&candles, output.as_deref(), format)?;

    info!(
        symbol,
        granularity,
        records = candles.len(),
        stats = %cache.stats(),
        "Query complete"
    );
    Ok(())
}
