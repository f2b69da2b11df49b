//! Durable, transactional storage for named content indexes
//!
//! The store is a single redb database file holding a two-level schema:
//!
//! - `indexes`: registry table, index name -> name of that index's hashes table
//! - `index/<name>/hashes`: one table per index, 32-byte content hash -> encoded [`Entry`]
//!
//! redb provides the single-writer / multi-reader discipline: [`Store::write`] runs its body
//! in an exclusive write transaction that commits only on `Ok`, while [`Store::read`] bodies
//! see a consistent snapshot and may run concurrently.
//!
//! [`Entry`]: crate::models::Entry

pub mod database;
pub mod namespace;
pub mod transaction;

pub use database::Store;
pub use namespace::{HashTable, Namespace, ReadOnlyHashTable};
pub use transaction::{ReadTxn, WriteTxn};
