//! JSON output format.
//!
//! Candles are written as objects with the same columns as the CSV output:
//! an RFC 3339 `timestamp` followed by the OHLCV values.

use serde::{Serialize, Serializer as _};
use std::io::Write;
use tscache_types::Candle;

use crate::formatter::render_timestamp;
use crate::{FormatError, Formatter};

/// One output row.
#[derive(Serialize)]
struct CandleRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<&Candle> for CandleRow {
    fn from(candle: &Candle) -> Self {
        Self {
            timestamp: render_timestamp(candle.time_ms),
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
        }
    }
}

/// JSON formatter writing either one array or one object per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter {
    lines: bool,
    pretty: bool,
}

impl JsonFormatter {
    /// Writes a single JSON array.
    #[must_use]
    pub const fn array() -> Self {
        Self {
            lines: false,
            pretty: false,
        }
    }

    /// Writes newline-delimited JSON, one candle per line.
    #[must_use]
    pub const fn ndjson() -> Self {
        Self {
            lines: true,
            pretty: false,
        }
    }

    /// Indents array output. Ignored for NDJSON.
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Whether this formatter writes NDJSON.
    #[must_use]
    pub const fn is_ndjson(&self) -> bool {
        self.lines
    }
}

fn write_array<W, F>(
    mut serializer: serde_json::Serializer<W, F>,
    candles: &[Candle],
) -> Result<(), serde_json::Error>
where
    W: Write,
    F: serde_json::ser::Formatter,
{
    (&mut serializer).collect_seq(candles.iter().map(CandleRow::from))
}

impl Formatter for JsonFormatter {
    fn write_candles<W: Write>(
        &self,
        candles: &[Candle],
        mut writer: W,
    ) -> Result<(), FormatError> {
        if self.lines {
            for candle in candles {
                serde_json::to_writer(&mut writer, &CandleRow::from(candle))?;
                writeln!(writer)?;
            }
        } else {
            if self.pretty {
                write_array(serde_json::Serializer::pretty(&mut writer), candles)?;
            } else {
                write_array(serde_json::Serializer::new(&mut writer), candles)?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }

    fn extension(&self) -> &str {
        if self.lines { "ndjson" } else { "json" }
    }
}
