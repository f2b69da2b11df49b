//! Index building from directory trees
//!
//! # Error Handling Strategy
//!
//! Indexing is all-or-nothing:
//!
//! - **File-level errors**: an unreadable file, a hashing failure or a walk error aborts the
//!   run. Nothing is committed, so re-running after fixing the problem is always safe.
//!
//! - **Sidecar errors**: a Takeout sidecar that can't be parsed is the one tolerated failure.
//!   It is logged as a warning and the photo is indexed without it, since the sidecar only
//!   carries auxiliary metadata.
//!
//! - **Progress**: reported through [`IndexObserver`]; [`count_files`] is an optional
//!   pre-count walk and never affects what gets indexed.

pub mod builder;
pub mod sidecar;
pub mod sniff;

pub use builder::{
    IndexMode, IndexObserver, IndexReport, count_files, index_files, index_takeout, index_tree,
};
pub use sidecar::read_taken_time;
pub use sniff::{DEFAULT_CONTENT_TYPE, SNIFF_LEN, detect_content_type, sniff};
