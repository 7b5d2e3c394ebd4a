//! Block addressing.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::Granularity;

/// Error for symbols that cannot be used as a directory name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// The symbol is empty.
    #[error("symbol must not be empty")]
    Empty,

    /// The symbol would escape or alias its directory.
    #[error("symbol '{0}' is not a valid directory name")]
    InvalidPath(String),
}

/// Checks that a symbol maps to exactly one directory below the cache root.
///
/// # Errors
///
/// Returns an error if the symbol is empty, is `.` or `..`, or contains a
/// path separator or NUL byte.
pub fn validate_symbol(symbol: &str) -> Result<(), SymbolError> {
    if symbol.is_empty() {
        return Err(SymbolError::Empty);
    }
    if symbol == "." || symbol == ".." || symbol.contains(['/', '\\', '\0']) {
        return Err(SymbolError::InvalidPath(symbol.to_string()));
    }
    Ok(())
}

/// Address of a single block: `(symbol, granularity, block_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockKey {
    symbol: String,
    granularity: Granularity,
    index: i64,
}

impl BlockKey {
    /// Creates a new block key.
    #[must_use]
    pub fn new(symbol: impl Into<String>, granularity: Granularity, index: i64) -> Self {
        Self {
            symbol: symbol.into(),
            granularity,
            index,
        }
    }

    /// Returns the symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the granularity.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Returns the block index.
    #[must_use]
    pub const fn index(&self) -> i64 {
        self.index
    }

    /// Returns the key of the following block.
    #[must_use]
    pub fn next(&self) -> Self {
        Self::new(self.symbol.clone(), self.granularity, self.index + 1)
    }

    /// Returns the directory holding every block of this key's series.
    ///
    /// Layout: `{root}/{symbol}/{granularity}`
    #[must_use]
    pub fn series_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.symbol).join(self.granularity.to_string())
    }

    /// Returns the file path of this block.
    ///
    /// Layout: `{root}/{symbol}/{granularity}/{block_index}`
    #[must_use]
    pub fn path(&self, root: &Path) -> PathBuf {
        self.series_dir(root).join(self.index.to_string())
    }
}

impl std::fmt::Display for BlockKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.symbol, self.granularity, self.index)
    }
}
