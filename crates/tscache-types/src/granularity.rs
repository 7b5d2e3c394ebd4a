//! Sampling granularity parsing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::GranularityParseError;

/// Unit suffix of a granularity descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GranularityUnit {
    /// Seconds (`s`).
    Second,
    /// Minutes (`m`).
    Minute,
    /// Hours (`h`).
    Hour,
    /// Days (`d`).
    Day,
}

impl GranularityUnit {
    /// Returns the unit length in seconds.
    #[must_use]
    pub const fn seconds(&self) -> u64 {
        match self {
            Self::Second => 1,
            Self::Minute => 60,
            Self::Hour => 3600,
            Self::Day => 86400,
        }
    }

    /// Returns the unit suffix character.
    #[must_use]
    pub const fn suffix(&self) -> char {
        match self {
            Self::Second => 's',
            Self::Minute => 'm',
            Self::Hour => 'h',
            Self::Day => 'd',
        }
    }

    const fn from_suffix(c: char) -> Option<Self> {
        match c {
            's' => Some(Self::Second),
            'm' => Some(Self::Minute),
            'h' => Some(Self::Hour),
            'd' => Some(Self::Day),
            _ => None,
        }
    }
}

/// A sampling interval such as `15m` or `1d`.
///
/// Two granularities with the same duration but different spelling (`60m` and
/// `1h`) are distinct values and address distinct cache directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Granularity {
    value: u32,
    unit: GranularityUnit,
}

impl Granularity {
    /// Creates a granularity from a positive multiplier and a unit.
    ///
    /// Returns `None` if `value` is zero.
    #[must_use]
    pub const fn new(value: u32, unit: GranularityUnit) -> Option<Self> {
        if value == 0 {
            return None;
        }
        Some(Self { value, unit })
    }

    /// Returns the numeric multiplier.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Returns the unit.
    #[must_use]
    pub const fn unit(&self) -> GranularityUnit {
        self.unit
    }

    /// Returns the interval length in seconds. Always positive.
    #[must_use]
    pub const fn seconds(&self) -> u64 {
        self.value as u64 * self.unit.seconds()
    }

    /// Returns the interval length in milliseconds.
    #[must_use]
    pub const fn milliseconds(&self) -> u64 {
        self.seconds() * 1000
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

impl FromStr for Granularity {
    type Err = GranularityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(unit_char) = s.chars().last() else {
            return Err(GranularityParseError::Malformed(s.to_string()));
        };
        let digits = &s[..s.len() - unit_char.len_utf8()];

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GranularityParseError::Malformed(s.to_string()));
        }

        let unit = GranularityUnit::from_suffix(unit_char).ok_or_else(|| {
            GranularityParseError::UnknownUnit {
                input: s.to_string(),
                unit: unit_char,
            }
        })?;

        let value: u32 = digits
            .parse()
            .map_err(|_| GranularityParseError::Overflow(s.to_string()))?;

        Self::new(value, unit).ok_or_else(|| GranularityParseError::Zero(s.to_string()))
    }
}

impl Serialize for Granularity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Granularity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
