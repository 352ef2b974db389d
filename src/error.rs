//! Typed errors at the crate's public boundary.
//!
//! Internal helpers (the builder, tests) reach for `anyhow::Result`;
//! anything that crosses into the public API is converted to one of these
//! variants instead.

use thiserror::Error;

/// Three error kinds, and nothing else: a cache miss is never an error (see
/// [`crate::cache::RadixCache::find`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrieError {
    /// Input not in lex order, a missing delimiter, invalid alphabet bytes
    /// on decode, or a tag bitmap whose header popcount disagrees with its
    /// group-word count.
    #[error("domain error: {0}")]
    Domain(String),

    /// `pos0` past the end of its blob or iteration budget, or a
    /// letter-stream read past `letterStart + nodeCount * bitslen`.
    #[error("index error: {0}")]
    Index(String),

    /// `nodecount`, W, L1 or L2 disagree with what the blobs encode.
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TrieError>;

impl TrieError {
    pub(crate) fn domain(msg: impl Into<String>) -> Self {
        TrieError::Domain(msg.into())
    }
    pub(crate) fn index(msg: impl Into<String>) -> Self {
        TrieError::Index(msg.into())
    }
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        TrieError::Config(msg.into())
    }
}
