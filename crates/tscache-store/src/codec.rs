//! Record sequence codecs.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur while encoding or decoding a block.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Bincode encoding or decoding failed.
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Trait for block codecs.
///
/// `decode(encode(records))` must return the same sequence. Codecs carry no
/// schema information; the record type is fixed by the caller.
pub trait Codec: Send + Sync {
    /// Encodes a record sequence into bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be serialized.
    fn encode<R: Serialize>(&self, records: &[R]) -> Result<Vec<u8>, CodecError>;

    /// Decodes a record sequence from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid encoding of `Vec<R>`.
    fn decode<R: DeserializeOwned>(&self, bytes: &[u8]) -> Result<Vec<R>, CodecError>;

    /// Returns a short name used in log output.
    fn name(&self) -> &'static str;
}

/// Compact binary codec backed by `bincode`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn encode<R: Serialize>(&self, records: &[R]) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(records)?)
    }

    fn decode<R: DeserializeOwned>(&self, bytes: &[u8]) -> Result<Vec<R>, CodecError> {
        Ok(bincode::deserialize(bytes)?)
    }

    fn name(&self) -> &'static str {
        "bincode"
    }
}

/// Human-readable codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<R: Serialize>(&self, records: &[R]) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(records)?)
    }

    fn decode<R: DeserializeOwned>(&self, bytes: &[u8]) -> Result<Vec<R>, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tscache_types::Candle;

    // Mirrors the untyped [time, open, high, low, close, volume] rows some
    // exchanges return.
    type Row = (i64, f64, f64, f64, f64, f64);

    fn rows() -> Vec<Row> {
        vec![
            (1_577_836_800_000, 7195.24, 7196.25, 7175.46, 7177.02, 511.814),
            (1_577_837_700_000, 7176.47, 7230.0, 7175.71, 7216.27, 883.052),
        ]
    }

    #[test]
    fn test_bincode_heterogeneous_tuples() {
        let codec = BincodeCodec;
        let bytes = codec.encode(&rows()).unwrap();
        let decoded: Vec<Row> = codec.decode(&bytes).unwrap();
        assert_eq!(decoded, rows());
    }

    #[test]
    fn test_json_structs() {
        let codec = JsonCodec;
        let candles = vec![Candle::new(0, 1.0, 2.0, 0.5, 1.5, 3.0)];
        let bytes = codec.encode(&candles).unwrap();
        assert!(bytes.starts_with(b"["));
        let decoded: Vec<Candle> = codec.decode(&bytes).unwrap();
        assert_eq!(decoded, candles);
    }

    #[test]
    fn test_empty_sequence() {
        let codec = BincodeCodec;
        let bytes = codec.encode::<Row>(&[]).unwrap();
        let decoded: Vec<Row> = codec.decode(&bytes).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_truncated_input_fails() {
        let codec = BincodeCodec;
        let bytes = codec.encode(&rows()).unwrap();
        let result: Result<Vec<Row>, _> = codec.decode(&bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(CodecError::Bincode(_))));

        let result: Result<Vec<Row>, _> = JsonCodec.decode(b"[[1, 2.0");
        assert!(matches!(result, Err(CodecError::Json(_))));
    }
}
