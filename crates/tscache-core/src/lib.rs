//! Block fetch engine and query orchestration for tscache.
//!
//! This crate provides the caching engine:
//!
//! - [`Fetcher`] - Capability for retrieving one page of records from a remote source
//! - [`BlockFetcher`] - Ensures a block is on disk, paginating through a [`Fetcher`]
//! - [`Cache`] - Maps query ranges to blocks, slices and concatenates them
//! - [`CacheConfig`] - Page limit, block size, anchor time and short-block policy

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod block;
mod cache;
mod config;
mod error;
mod fetcher;
mod spans;
mod stats;

pub use block::{BlockFetcher, BlockOrigin, FetchedBlock};
pub use cache::{Cache, WarmReport, slice_bounds};
pub use config::{CacheConfig, ShortBlockAlignment};
pub use error::{CacheError, Result};
pub use fetcher::Fetcher;
pub use stats::CacheStats;
