//! Core types for the tscache time-series block cache.
//!
//! This crate provides the fundamental data structures used throughout tscache:
//!
//! - [`Granularity`] - Sampling interval such as `15m`, parsed into seconds
//! - [`IndexCalculator`] - Timestamp to global index and block index arithmetic
//! - [`BlockKey`] - Address of one persisted block
//! - [`QueryRange`] - Validated inclusive time range for a query
//! - [`Candle`] - OHLCV record used by the exchange adapters

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod block;
mod candle;
mod error;
mod granularity;
mod index;
mod range;

pub use block::{BlockKey, SymbolError, validate_symbol};
pub use candle::Candle;
pub use error::{GranularityParseError, RangeError};
pub use granularity::{Granularity, GranularityUnit};
pub use index::{BASE_DATE_SECS, DEFAULT_BLOCK_SIZE, IndexCalculator, base_date};
pub use range::QueryRange;
