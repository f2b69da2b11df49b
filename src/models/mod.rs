//! Data models for content indexes.
//!
//! - [`ContentHash`] - SHA-256 key of an entry, with hex rendering and shard layout
//! - [`Entry`] - every known location and descriptive metadata for one unique content
//!
//! Entries are stored with serde + bincode; see [`Entry::encode`] and [`Entry::decode`].

pub mod entry;
pub mod hash;

pub use entry::{Entry, extension_of};
pub use hash::{ContentHash, HashingReader};
