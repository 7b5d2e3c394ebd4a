//! On-disk block storage for the tscache time-series block cache.
//!
//! This crate provides:
//!
//! - [`Codec`] - Record sequence encoding, with [`BincodeCodec`] and [`JsonCodec`]
//! - [`BlockStore`] - Existence checks, loads and atomic saves of block files

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod codec;
mod store;

pub use codec::{BincodeCodec, Codec, CodecError, JsonCodec};
pub use store::{BlockStore, StoreError};
