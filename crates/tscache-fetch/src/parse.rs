//! Klines response parsing.

use serde_json::Value;
use thiserror::Error;
use tscache_types::Candle;

/// Errors that can occur while parsing a klines response.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The body is not a JSON array of arrays.
    #[error("Invalid klines response: {0}")]
    Json(#[from] serde_json::Error),

    /// A row has fewer than six fields.
    #[error("Kline row {row} has {len} fields (expected at least 6)")]
    ShortRow {
        /// Row number in the response.
        row: usize,
        /// Number of fields found.
        len: usize,
    },

    /// A field is not a number or numeric string.
    #[error("Kline row {row} has a non-numeric value in column {column}")]
    InvalidField {
        /// Row number in the response.
        row: usize,
        /// Column number in the row.
        column: usize,
    },
}

/// Parses a klines response body into candles.
///
/// Each row is `[open_time_ms, open, high, low, close, volume, ...]`, with
/// prices and volume encoded as decimal strings. Trailing columns are ignored.
///
/// # Errors
///
/// Returns an error if the body is not an array of rows or a row is malformed.
pub fn parse_klines(body: &[u8]) -> Result<Vec<Candle>, ParseError> {
    let rows: Vec<Vec<Value>> = serde_json::from_slice(body)?;

    rows.iter()
        .enumerate()
        .map(|(row, fields)| parse_row(row, fields))
        .collect()
}

fn parse_row(row: usize, fields: &[Value]) -> Result<Candle, ParseError> {
    if fields.len() < 6 {
        return Err(ParseError::ShortRow {
            row,
            len: fields.len(),
        });
    }

    let time_ms = fields[0]
        .as_i64()
        .ok_or(ParseError::InvalidField { row, column: 0 })?;
    let number = |column: usize| {
        let value = match &fields[column] {
            Value::String(s) => s.parse::<f64>().ok(),
            other => other.as_f64(),
        };
        value.ok_or(ParseError::InvalidField { row, column })
    };

    Ok(Candle::new(
        time_ms,
        number(1)?,
        number(2)?,
        number(3)?,
        number(4)?,
        number(5)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"[
        [1577836800000, "7195.24", "7196.25", "7178.64", "7179.78", "95.51", 1577837699999, "686078.11", 1127, "32.08", "230504.26", "0"],
        [1577837700000, "7179.76", "7191.77", "7178.20", "7191.07", "59.50", 1577838599999, "427431.39", 759, "31.06", "223123.40", "0"]
    ]"#;

    #[test]
    fn test_parse_klines() {
        let candles = parse_klines(BODY.as_bytes()).unwrap();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time_ms, 1_577_836_800_000);
        assert!((candles[0].open - 7195.24).abs() < 1e-9);
        assert!((candles[0].volume - 95.51).abs() < 1e-9);
        assert!(candles[1].is_bullish());
    }

    #[test]
    fn test_parse_numeric_fields() {
        let candles = parse_klines(b"[[0, 1.5, 2, 1, 1.75, 10]]").unwrap();
        assert_eq!(candles, vec![Candle::new(0, 1.5, 2.0, 1.0, 1.75, 10.0)]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_klines(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_short_row() {
        let result = parse_klines(b"[[0, \"1\", \"2\"]]");
        assert!(matches!(result, Err(ParseError::ShortRow { row: 0, len: 3 })));
    }

    #[test]
    fn test_parse_invalid_field() {
        let result = parse_klines(b"[[0, \"1\", \"x\", \"1\", \"1\", \"1\"]]");
        assert!(matches!(
            result,
            Err(ParseError::InvalidField { row: 0, column: 2 })
        ));
    }

    #[test]
    fn test_parse_error_object() {
        let result = parse_klines(br#"{"code": -1121, "msg": "Invalid symbol."}"#);
        assert!(matches!(result, Err(ParseError::Json(_))));
    }
}
