//! Blocks command implementation.
//!
//! This module lists the blocks stored for a series with the time span each
//! one covers.

use super::{CacheOptions, open_cache};
use crate::display::parse_granularity;
use anyhow::Result;
use chrono::{DateTime, Utc};
use tscache_lib::BlockKey;
use tscache_lib::prelude::*;

/// List cached blocks for a symbol and granularity.
pub(crate) fn list_blocks(
    options: &CacheOptions,
    symbol: &str,
    granularity_str: &str,
) -> Result<()> {
    let granularity = parse_granularity(granularity_str)?;
    let cache = open_cache(options)?;
    let blocks = cache.cached_blocks(symbol, granularity)?;

    if blocks.is_empty() {
        println!("No blocks cached for {symbol} {granularity}.");
        return Ok(());
    }

    let index = cache.index();
    let block_size = cache.config().block_size;

    println!("{:<10} {:<22} {:<22} {:>8}", "BLOCK", "START", "UNTIL", "RECORDS");
    println!("{}", "-".repeat(65));

    let mut total = 0;
    for block_index in &blocks {
        let start = index.block_start_time(*block_index, granularity, block_size);
        let end = index.block_start_time(block_index + 1, granularity, block_size);
        let key = BlockKey::new(symbol, granularity, *block_index);
        let records = cache.store().load::<Candle>(&cache.store().block_path(&key));

        let count = match records.map(|r| r.len()) {
            Ok(n) => {
                total += n;
                n.to_string()
            }
            Err(_) => "corrupt".to_string(),
        };

        println!(
            "{:<10} {:<22} {:<22} {:>8}",
            block_index,
            format_time(start),
            format_time(end),
            count
        );
    }

    println!("\nTotal: {} blocks, {} records", blocks.len(), total);
    Ok(())
}

fn format_time(t: Option<DateTime<Utc>>) -> String {
    t.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}
