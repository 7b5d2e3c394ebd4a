//! Block file persistence.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;
use tscache_types::{BlockKey, Granularity};

use crate::{BincodeCodec, Codec, CodecError};

/// Errors that can occur while reading or writing block files.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create a directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read a block file.
    #[error("Failed to read block file '{path}': {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write the temporary file for a block.
    #[error("Failed to write block file '{path}': {source}")]
    WriteFile {
        /// The block path being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to move a written block into place.
    #[error("Failed to persist block file '{path}': {source}")]
    Persist {
        /// The block path being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read a series directory.
    #[error("Failed to read directory '{path}': {source}")]
    ReadDir {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Stored bytes could not be decoded.
    #[error("Corrupt block file '{path}': {source}")]
    CorruptBlock {
        /// The block path.
        path: PathBuf,
        /// The decoding error.
        source: CodecError,
    },

    /// Records could not be encoded.
    #[error("Failed to encode block '{path}': {source}")]
    Encode {
        /// The block path.
        path: PathBuf,
        /// The encoding error.
        source: CodecError,
    },
}

/// Result type for store operations.
pub(crate) type Result<T> = std::result::Result<T, StoreError>;

/// Reads and writes block files below a root directory.
///
/// Blocks live at `{root}/{symbol}/{granularity}/{block_index}`. There is no
/// index or manifest file; the directory tree is the only state.
#[derive(Debug, Clone)]
pub struct BlockStore<C = BincodeCodec> {
    root: PathBuf,
    codec: C,
}

impl BlockStore<BincodeCodec> {
    /// Creates a store rooted at `root` using the default bincode codec.
    ///
    /// Nothing is created on disk until the first save.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_codec(root, BincodeCodec)
    }
}

impl<C: Codec> BlockStore<C> {
    /// Creates a store rooted at `root` using the given codec.
    #[must_use]
    pub fn with_codec(root: impl Into<PathBuf>, codec: C) -> Self {
        Self {
            root: root.into(),
            codec,
        }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the codec.
    #[must_use]
    pub const fn codec(&self) -> &C {
        &self.codec
    }

    /// Returns the file path of a block.
    #[must_use]
    pub fn block_path(&self, key: &BlockKey) -> PathBuf {
        key.path(&self.root)
    }

    /// Returns true if a block file exists at `path`.
    #[must_use]
    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Loads and decodes the block file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ReadFile`] if the file cannot be read and
    /// [`StoreError::CorruptBlock`] if its contents cannot be decoded.
    pub fn load<R: DeserializeOwned>(&self, path: &Path) -> Result<Vec<R>> {
        debug!(path = %path.display(), codec = self.codec.name(), "Loading block");

        let bytes = fs::read(path).map_err(|e| StoreError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.codec
            .decode(&bytes)
            .map_err(|e| StoreError::CorruptBlock {
                path: path.to_path_buf(),
                source: e,
            })
    }

    /// Encodes `records` and writes them to `path`, replacing any existing file.
    ///
    /// The parent directory is created if absent. The bytes are written to a
    /// temporary file in the same directory and then renamed over `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or any filesystem step fails.
    pub fn save<R: Serialize>(&self, path: &Path, records: &[R]) -> Result<()> {
        let bytes = self
            .codec
            .encode(records)
            .map_err(|e| StoreError::Encode {
                path: path.to_path_buf(),
                source: e,
            })?;

        let parent = path.parent().unwrap_or(&self.root);
        if !parent.is_dir() {
            fs::create_dir_all(parent).map_err(|e| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
            debug!(path = %parent.display(), "Created cache directory");
        }

        let write_err = |e| StoreError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        };
        let mut temp = NamedTempFile::new_in(parent).map_err(write_err)?;
        temp.write_all(&bytes).map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;

        temp.persist(path).map_err(|e| StoreError::Persist {
            path: path.to_path_buf(),
            source: e.error,
        })?;

        debug!(
            path = %path.display(),
            records = records.len(),
            bytes = bytes.len(),
            "Saved block"
        );

        Ok(())
    }

    /// Lists the block indices stored for a series, in ascending order.
    ///
    /// Files whose names are not integers (such as leftover temporary files)
    /// are ignored. A series that was never written yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the series directory exists but cannot be read.
    pub fn list_blocks(&self, symbol: &str, granularity: Granularity) -> Result<Vec<i64>> {
        let dir = BlockKey::new(symbol, granularity, 0).series_dir(&self.root);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|e| StoreError::ReadDir {
            path: dir.clone(),
            source: e,
        })?;

        let mut blocks = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::ReadDir {
                path: dir.clone(),
                source: e,
            })?;

            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(index) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.parse::<i64>().ok())
            {
                blocks.push(index);
            }
        }

        blocks.sort_unstable();
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonCodec;
    use tempfile::TempDir;
    use tscache_types::Candle;

    fn key(index: i64) -> BlockKey {
        BlockKey::new("BTCUSDT", "15m".parse().unwrap(), index)
    }

    fn candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let p = 100.0 + i as f64;
                Candle::new(i as i64 * 900_000, p, p + 1.0, p - 1.0, p + 0.5, 10.0)
            })
            .collect()
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = BlockStore::new(temp_dir.path());
        let path = store.block_path(&key(3));

        assert!(!store.exists(&path));
        store.save(&path, &candles(5)).unwrap();
        assert!(store.exists(&path));

        let loaded: Vec<Candle> = store.load(&path).unwrap();
        assert_eq!(loaded, candles(5));
    }

    #[test]
    fn test_save_creates_series_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = BlockStore::new(temp_dir.path().join("nested"));
        let path = store.block_path(&key(0));

        store.save(&path, &candles(1)).unwrap();

        assert!(temp_dir.path().join("nested/BTCUSDT/15m").is_dir());
        assert!(temp_dir.path().join("nested/BTCUSDT/15m/0").is_file());
    }

    #[test]
    fn test_save_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let store = BlockStore::new(temp_dir.path());
        let path = store.block_path(&key(0));

        store.save(&path, &candles(4)).unwrap();
        store.save(&path, &candles(2)).unwrap();

        let loaded: Vec<Candle> = store.load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = BlockStore::new(temp_dir.path());
        let path = store.block_path(&key(0));

        store.save(&path, &candles(3)).unwrap();

        let names: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("0")]);
    }

    #[test]
    fn test_load_corrupt_block() {
        let temp_dir = TempDir::new().unwrap();
        let store = BlockStore::new(temp_dir.path());
        let path = store.block_path(&key(0));

        store.save(&path, &candles(3)).unwrap();
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

        let result: Result<Vec<Candle>> = store.load(&path);
        assert!(matches!(result, Err(StoreError::CorruptBlock { .. })));
    }

    #[test]
    fn test_load_missing_block() {
        let temp_dir = TempDir::new().unwrap();
        let store = BlockStore::new(temp_dir.path());

        let result: Result<Vec<Candle>> = store.load(&store.block_path(&key(9)));
        assert!(matches!(result, Err(StoreError::ReadFile { .. })));
    }

    #[test]
    fn test_json_codec_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = BlockStore::with_codec(temp_dir.path(), JsonCodec);
        let path = store.block_path(&key(1));

        store.save(&path, &candles(2)).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with('['));
        let loaded: Vec<Candle> = store.load(&path).unwrap();
        assert_eq!(loaded, candles(2));
    }

    #[test]
    fn test_list_blocks() {
        let temp_dir = TempDir::new().unwrap();
        let store = BlockStore::new(temp_dir.path());
        let granularity = "15m".parse().unwrap();

        assert!(store.list_blocks("BTCUSDT", granularity).unwrap().is_empty());

        for index in [12, 3, 7] {
            store.save(&store.block_path(&key(index)), &candles(1)).unwrap();
        }
        let series = key(0).series_dir(temp_dir.path());
        fs::write(series.join(".tmpXYZ"), b"partial").unwrap();
        fs::write(series.join("notes.txt"), b"hello").unwrap();

        assert_eq!(
            store.list_blocks("BTCUSDT", granularity).unwrap(),
            vec![3, 7, 12]
        );
        assert!(store.list_blocks("ETHUSDT", granularity).unwrap().is_empty());
    }
}
