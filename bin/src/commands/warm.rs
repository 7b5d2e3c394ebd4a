//! Warm command implementation.
//!
//! This module fetches every block covering a range so later queries are
//! served from disk.

use super::{CacheOptions, open_cache};
use crate::display::{parse_end, parse_granularity, parse_time};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tscache_lib::prelude::*;

/// Ensure every block covering the range is on disk.
pub(crate) fn warm(
    options: &CacheOptions,
    symbol: &str,
    granularity_str: &str,
    start_str: &str,
    end_str: Option<&str>,
    quiet: bool,
) -> Result<()> {
    let granularity = parse_granularity(granularity_str)?;
    let range = QueryRange::new(parse_time(start_str)?, parse_end(end_str)?)?;
    let cache = open_cache(options)?;

    let blocks = cache.block_range(granularity, &range)?;
    let total = (blocks.end() - blocks.start() + 1) as u64;

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} blocks ({percent}%) {msg}")
                .context("Invalid progress template")?
                .progress_chars("=>-"),
        );
        pb.set_message(format!("{symbol} {granularity} {range}"));
        pb
    };

    let report = cache
        .warm(symbol, granularity, &range, |_, _| progress.inc(1))
        .with_context(|| format!("Warm failed for {symbol} {granularity}"))?;

    progress.finish_with_message(format!(
        "{} blocks ({} cached, {} fetched in {} requests)",
        report.blocks(),
        report.cached,
        report.fetched,
        report.pages
    ));

    if !quiet {
        println!("Cache: {}", cache.root().display());
    }
    Ok(())
}
