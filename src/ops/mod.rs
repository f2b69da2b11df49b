//! Operations over indexes already in the store
//!
//! # Error Handling Strategy
//!
//! - **Set algebra and chunking** write their targets inside a single transaction that also
//!   checks the preconditions. Any failure leaves the store exactly as it was.
//!
//! - **Materialization** reads a snapshot and writes to the filesystem. It stops on the first
//!   error, but every file already published is complete and verified, and a re-run skips
//!   them.

pub mod inspect;
pub mod materialize;
pub mod set;

pub use inspect::{
    ChunkReport, IndexStats, chunk, delete_index, entries, entry_count, list_indexes, stats,
};
pub use materialize::{MaterializeObserver, MaterializeReport, materialize};
pub use set::{SetOp, apply, difference, intersection, union};
