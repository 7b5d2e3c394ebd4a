//! HTTP klines fetcher for the tscache time-series block cache.
//!
//! This crate provides a remote source adapter:
//!
//! - [`url::klines_url`] - Constructs paged klines URLs
//! - [`KlinesFetcher`] - Blocking HTTP client with retries, implements [`tscache_core::Fetcher`]
//! - [`parse_klines`] - JSON klines response parsing

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod parse;
pub mod url;

pub use client::{ClientConfig, FetchError, KlinesFetcher};
pub use parse::{ParseError, parse_klines};
