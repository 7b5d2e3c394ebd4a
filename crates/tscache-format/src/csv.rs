//! CSV output format.

use std::io::Write;
use tscache_types::Candle;

use crate::formatter::render_timestamp;
use crate::{FormatError, Formatter};

/// CSV formatter.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: char,
    /// Whether to include header row.
    include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self::new().with_delimiter('\t')
    }
}

impl Formatter for CsvFormatter {
    fn write_candles<W: Write>(
        &self,
        candles: &[Candle],
        mut writer: W,
    ) -> Result<(), FormatError> {
        let d = self.delimiter;

        if self.include_header {
            writeln!(writer, "timestamp{d}open{d}high{d}low{d}close{d}volume")?;
        }

        for candle in candles {
            let timestamp = render_timestamp(candle.time_ms);
            writeln!(
                writer,
                "{timestamp}{d}{}{d}{}{d}{}{d}{}{d}{}",
                candle.open, candle.high, candle.low, candle.close, candle.volume
            )?;
        }

        writer.flush()?;
        Ok(())
    }

    fn extension(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_candle() -> Candle {
        // 2024-01-15T12:30:00Z
        Candle::new(1_705_321_800_000, 42000.5, 42100.0, 41950.25, 42050.0, 12.5)
    }

    #[test]
    fn test_csv_candles() {
        let formatter = CsvFormatter::new();
        let mut output = Vec::new();

        formatter
            .write_candles(&[create_test_candle()], &mut output)
            .unwrap();

        let result = String::from_utf8(output).unwrap();
        let lines: Vec<_> = result.lines().collect();
        assert_eq!(lines[0], "timestamp,open,high,low,close,volume");
        assert_eq!(lines[1], "2024-01-15T12:30:00Z,42000.5,42100,41950.25,42050,12.5");
    }

    #[test]
    fn test_csv_no_header() {
        let formatter = CsvFormatter::new().with_header(false);
        let mut output = Vec::new();

        formatter
            .write_candles(&[create_test_candle()], &mut output)
            .unwrap();

        let result = String::from_utf8(output).unwrap();
        assert!(!result.contains("timestamp,open"));
        assert_eq!(result.lines().count(), 1);
    }

    #[test]
    fn test_tsv() {
        let formatter = CsvFormatter::tsv();
        let mut output = Vec::new();

        formatter
            .write_candles(&[create_test_candle()], &mut output)
            .unwrap();

        let result = String::from_utf8(output).unwrap();
        assert!(result.contains("timestamp\topen\thigh"));
        assert_eq!(formatter.extension(), "csv");
    }
}
