//! Display utilities and output formatting for the tscache CLI.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use directories::ProjectDirs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tscache_lib::prelude::*;

/// Output format for queried candles.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
    Ndjson,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => Self::Csv,
            Format::Json => Self::Json,
            Format::Ndjson => Self::Ndjson,
        }
    }
}

/// Which end of a short block is assumed to be missing records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Alignment {
    /// History began inside the block (newly listed symbols).
    Start,
    /// History stops inside the block (ranges reaching up to now).
    End,
}

impl From<Alignment> for ShortBlockAlignment {
    fn from(alignment: Alignment) -> Self {
        match alignment {
            Alignment::Start => Self::Start,
            Alignment::End => Self::End,
        }
    }
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the verbosity flags.
pub(crate) fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the default cache directory.
pub(crate) fn default_cache_dir() -> PathBuf {
    ProjectDirs::from("", "", "tscache").map_or_else(
        || {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".tscache")
        },
        |proj_dirs| proj_dirs.cache_dir().to_path_buf(),
    )
}

/// Parses a time argument as a date (midnight UTC) or an RFC 3339 timestamp.
pub(crate) fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("Invalid time: {s} (expected YYYY-MM-DD or RFC 3339)"))
}

/// Parses an optional end time, defaulting to now.
pub(crate) fn parse_end(s: Option<&str>) -> Result<DateTime<Utc>> {
    s.map_or_else(|| Ok(Utc::now()), parse_time)
}

/// Parses a granularity argument.
pub(crate) fn parse_granularity(s: &str) -> Result<Granularity> {
    s.parse::<Granularity>()
        .with_context(|| format!("Invalid granularity: {s}"))
}

/// Writes candles to a file, or stdout when no path is given.
pub(crate) fn write_output(
    candles: &[Candle],
    output: Option<&Path>,
    format: Format,
) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_candles(format.into(), candles, BufWriter::new(file))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write_candles(format.into(), candles, &mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}
