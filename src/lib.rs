//! venndex - Content-hash indexes of file trees, with set algebra and deduplicated export
//!
//! This library records every file under a directory tree by the SHA-256 of its content,
//! in named indexes kept in a single transactional store. It supports:
//!
//! - Indexing plain trees and Google Photos Takeout exports (with JSON sidecars)
//! - Union, intersection and difference of indexes into new indexes
//! - Listing, stats, chunking and deletion of indexes
//! - Materializing an index as a deduplicated, content-addressed directory tree
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use venndex::{Store, indexer, ops};
//!
//! let store = Store::initialize("venndex.db")?;
//! indexer::index_files(&store, "laptop", Path::new("/home/alice/Pictures"), &mut ())?;
//! indexer::index_files(&store, "backup", Path::new("/mnt/backup/Pictures"), &mut ())?;
//!
//! let missing = ops::difference(&store, "not-backed-up", "laptop", "backup")?;
//! println!("{missing} files are not backed up");
//! # Ok::<(), venndex::Error>(())
//! ```

pub mod cli;
pub mod error;
pub mod indexer;
pub mod models;
pub mod ops;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use error::{Error, Result};
pub use models::{ContentHash, Entry};
pub use store::Store;
