//! Index command implementation.
//!
//! This module shows how a timestamp maps onto global indices and blocks.

use crate::display::{parse_granularity, parse_time};
use anyhow::Result;
use tscache_lib::prelude::*;
use tscache_lib::{DEFAULT_BLOCK_SIZE, base_date};

/// Show index and block arithmetic for a timestamp.
pub(crate) fn show_index(timestamp: &str, granularity_str: &str) -> Result<()> {
    let granularity = parse_granularity(granularity_str)?;
    let at = parse_time(timestamp)?;
    let calc = IndexCalculator::default();

    let index = calc.to_index(at, granularity);
    let block = IndexCalculator::to_block_index(index, DEFAULT_BLOCK_SIZE);
    let (first, last) = IndexCalculator::block_bounds(block, DEFAULT_BLOCK_SIZE);

    println!("Timestamp:   {at}");
    println!("Anchor:      {}", base_date());
    println!("Granularity: {granularity} ({} seconds)", granularity.seconds());
    println!("Index:       {index}");
    println!("Block:       {block} (size {DEFAULT_BLOCK_SIZE})");
    println!("Offset:      {}", index - first);
    println!("Covers:      indices {first} to {last}");
    if let Some(start) = calc.block_start_time(block, granularity, DEFAULT_BLOCK_SIZE) {
        println!("Block start: {start}");
    }
    if index < 0 {
        println!("\nWarning: timestamp is before the anchor and cannot be queried.");
    }
    Ok(())
}
