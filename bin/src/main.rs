//! tscache CLI - Disk-backed cache for exchange candle data.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;

use display::{Alignment, Format};

#[derive(Parser)]
#[command(name = "tscache")]
#[command(about = "Disk-backed block cache for exchange candle data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Cache directory. Defaults to the platform data directory.
    #[arg(long, env = "TSCACHE_DIR", global = true)]
    cache_dir: Option<PathBuf>,

    /// Klines API base URL
    #[arg(long, env = "TSCACHE_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Maximum records per remote request
    #[arg(long, default_value = "1000", global = true)]
    limit: usize,

    /// Which end of a partially filled block is missing records
    #[arg(long, value_enum, default_value = "end", global = true)]
    alignment: Alignment,
}

#[derive(Subcommand)]
enum Commands {
    /// Query candles, fetching missing blocks
    Query {
        /// Symbol (e.g., BTCUSDT)
        symbol: String,

        /// Start time (YYYY-MM-DD or RFC 3339)
        #[arg(short, long)]
        start: String,

        /// End time (YYYY-MM-DD or RFC 3339). Defaults to now.
        #[arg(short, long)]
        end: Option<String>,

        /// Granularity (e.g., 1m, 15m, 1h, 1d)
        #[arg(short, long, default_value = "15m")]
        granularity: String,

        /// Output file path. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,
    },

    /// Fetch every block covering a range without printing records
    Warm {
        /// Symbol (e.g., BTCUSDT)
        symbol: String,

        /// Start time (YYYY-MM-DD or RFC 3339)
        #[arg(short, long)]
        start: String,

        /// End time (YYYY-MM-DD or RFC 3339). Defaults to now.
        #[arg(short, long)]
        end: Option<String>,

        /// Granularity (e.g., 1m, 15m, 1h, 1d)
        #[arg(short, long, default_value = "15m")]
        granularity: String,
    },

    /// List cached blocks for a series
    Blocks {
        /// Symbol (e.g., BTCUSDT)
        symbol: String,

        /// Granularity (e.g., 1m, 15m, 1h, 1d)
        #[arg(short, long, default_value = "15m")]
        granularity: String,
    },

    /// Show index and block arithmetic for a timestamp
    Index {
        /// Timestamp (YYYY-MM-DD or RFC 3339)
        timestamp: String,

        /// Granularity (e.g., 1m, 15m, 1h, 1d)
        #[arg(short, long, default_value = "15m")]
        granularity: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    display::init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let cache_dir = cli.cache_dir.unwrap_or_else(display::default_cache_dir);
    let options = commands::CacheOptions {
        cache_dir,
        base_url: cli.base_url,
        limit: cli.limit,
        alignment: cli.alignment,
    };

    match command {
        Commands::Query {
            symbol,
            start,
            end,
            granularity,
            output,
            format,
        } => commands::query::query(
            &options,
            &symbol,
            &granularity,
            &start,
            end.as_deref(),
            output,
            format,
        ),
        Commands::Warm {
            symbol,
            start,
            end,
            granularity,
        } => commands::warm::warm(
            &options,
            &symbol,
            &granularity,
            &start,
            end.as_deref(),
            cli.quiet,
        ),
        Commands::Blocks {
            symbol,
            granularity,
        } => commands::blocks::list_blocks(&options, &symbol, &granularity),
        Commands::Index {
            timestamp,
            granularity,
        } => commands::index::show_index(&timestamp, &granularity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_defaults_to_end() {
        let cli = Cli::try_parse_from(["tscache", "index", "2020-01-01"]).unwrap();
        assert_eq!(cli.alignment, Alignment::End);

        let cli =
            Cli::try_parse_from(["tscache", "--alignment", "start", "index", "2020-01-01"]).unwrap();
        assert_eq!(cli.alignment, Alignment::Start);
    }
}
