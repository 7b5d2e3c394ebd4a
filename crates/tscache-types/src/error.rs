//! Error types for tscache core types.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Error returned when parsing an invalid granularity string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GranularityParseError {
    /// The string does not have the `<digits><unit>` shape.
    #[error("invalid granularity '{0}', expected <positive integer><s|m|h|d> such as 15m")]
    Malformed(String),

    /// The unit suffix is not one of `s`, `m`, `h`, `d`.
    #[error("invalid granularity '{input}': unknown unit '{unit}', expected one of s, m, h, d")]
    UnknownUnit {
        /// The full input string.
        input: String,
        /// The offending unit character.
        unit: char,
    },

    /// The numeric prefix is zero.
    #[error("invalid granularity '{0}': interval must be positive")]
    Zero(String),

    /// The numeric prefix does not fit the supported range.
    #[error("invalid granularity '{0}': interval is too large")]
    Overflow(String),
}

impl GranularityParseError {
    /// Returns the input string that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        match self {
            Self::Malformed(s) | Self::Zero(s) | Self::Overflow(s) => s,
            Self::UnknownUnit { input, .. } => input,
        }
    }
}

/// Error for invalid query ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// Start timestamp is after end timestamp.
    #[error("Invalid time range: {start} > {end}")]
    InvalidRange {
        /// The start timestamp.
        start: DateTime<Utc>,
        /// The end timestamp.
        end: DateTime<Utc>,
    },
}
