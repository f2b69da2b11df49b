//! Error types for store, indexing, set algebra, and materialization
//!
//! # Error Handling Strategy
//!
//! Unlike a graceful-degradation tool, every failure here aborts the current top-level
//! operation in full:
//!
//! - **Store errors**: a missing store, index, or malformed namespace is reported with the
//!   offending name so the command layer can print something actionable.
//! - **Transactions**: writes are only committed when the whole operation succeeds, so an
//!   error never leaves a half-built index behind.
//! - **Filesystem errors**: wrapped together with the path that caused them.
//! - **Stale indexes**: materialization re-hashes every source and refuses to publish a file
//!   whose content no longer matches its key.
//!
//! The command layer wraps these with `anyhow` context; library consumers can match on
//! [`Error`] variants directly.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::ContentHash;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("venndex has not been initialized: no store at {}", .0.display())]
    NotInitialized(PathBuf),

    #[error("a store already exists at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("index {0:?} does not exist")]
    IndexNotFound(String),

    #[error("index {name:?} is not well-formed: {reason}")]
    IndexMalformed { name: String, reason: String },

    #[error("target index {0:?} already exists")]
    TargetAlreadyExists(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    #[error("path is not valid UTF-8: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("failed to decode entry: {0}")]
    Decode(String),

    #[error("failed to encode entry: {0}")]
    Encode(String),

    #[error("unreadable sidecar {}: {reason}", .path.display())]
    Sidecar { path: PathBuf, reason: String },

    #[error("hash mismatch for {hash} at {}: index is stale", .path.display())]
    StaleIndex { hash: ContentHash, path: PathBuf },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),
}

impl Error {
    /// Wrap an I/O error together with the path it happened at
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io { path: path.as_ref().to_path_buf(), source }
    }
}

/// Extension for attaching a path to `std::io::Result`s
pub(crate) trait IoResultExt<T> {
    fn at_path(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at_path(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|e| Error::io(path, e))
    }
}

macro_rules! storage_error_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Error {
                fn from(err: $ty) -> Self {
                    Self::Storage(redb::Error::from(err))
                }
            }
        )*
    };
}

storage_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Reject empty index names and similar required arguments
pub(crate) fn require_non_empty(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{what} cannot be empty")));
    }
    Ok(())
}
