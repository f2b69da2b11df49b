//! Set algebra between two indexes
//!
//! Every operation writes into a brand-new target index and leaves both sources untouched.
//! The preconditions (sources exist, target doesn't) are checked inside the same write
//! transaction that fills the target, so nothing can sneak in between check and write.

use std::fmt;

use redb::{ReadableTable, ReadableTableMetadata};
use tracing::info;

use crate::error::{Error, Result, require_non_empty};
use crate::models::Entry;
use crate::store::{HashTable, Namespace, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    /// Keys in A or B; shared keys are merged
    Union,
    /// Keys in both A and B, merged
    Intersection,
    /// Keys in A but not in B, copied from A unchanged
    Difference,
}

impl SetOp {
    pub fn name(&self) -> &'static str {
        match self {
            SetOp::Union => "union",
            SetOp::Intersection => "intersection",
            SetOp::Difference => "difference",
        }
    }
}

impl fmt::Display for SetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `target = a ∪ b`
pub fn union(store: &Store, target: &str, a: &str, b: &str) -> Result<u64> {
    apply(store, SetOp::Union, target, a, b)
}

/// `target = a ∩ b`
pub fn intersection(store: &Store, target: &str, a: &str, b: &str) -> Result<u64> {
    apply(store, SetOp::Intersection, target, a, b)
}

/// `target = a − b`
pub fn difference(store: &Store, target: &str, a: &str, b: &str) -> Result<u64> {
    apply(store, SetOp::Difference, target, a, b)
}

/// Compute `op` over indexes `a` and `b` into the new index `target`
///
/// Returns the number of entries written to `target`.
///
/// # Errors
///
/// Returns an error if:
/// - any of the three names is empty
/// - `target` already exists ([`Error::TargetAlreadyExists`])
/// - `a` or `b` doesn't exist or is malformed
/// - a stored entry cannot be decoded
///
/// On error the target index is not created.
pub fn apply(store: &Store, op: SetOp, target: &str, a: &str, b: &str) -> Result<u64> {
    require_non_empty(target, "target index name")?;
    require_non_empty(a, "index A name")?;
    require_non_empty(b, "index B name")?;

    let count = store.write(|tx| {
        if tx.exists(target)? {
            return Err(Error::TargetAlreadyExists(target.to_string()));
        }

        let first = tx.existing_namespace(a)?;
        // The same index may be used on both sides; it can only be opened once
        let second = if a == b { None } else { Some(tx.existing_namespace(b)?) };
        let mut out = tx.namespace(target)?;

        match &second {
            Some(second) => run(op, &first, second, &mut out),
            None => run(op, &first, &first, &mut out),
        }
    })?;

    info!(%op, target, a, b, entries = count, "set operation completed");
    Ok(count)
}

fn run<A, B>(
    op: SetOp,
    first: &Namespace<A>,
    second: &Namespace<B>,
    target: &mut Namespace<HashTable<'_>>,
) -> Result<u64>
where
    A: ReadableTable<&'static [u8], &'static [u8]> + ReadableTableMetadata,
    B: ReadableTable<&'static [u8], &'static [u8]> + ReadableTableMetadata,
{
    match op {
        SetOp::Union => merge_into(first, second, target, true),
        SetOp::Intersection => merge_into(first, second, target, false),
        SetOp::Difference => subtract_into(first, second, target),
    }
}

/// Walk `first`, merging keys shared with `second`; with `keep_unshared`, also copy keys
/// found on only one side
fn merge_into<A, B>(
    first: &Namespace<A>,
    second: &Namespace<B>,
    target: &mut Namespace<HashTable<'_>>,
    keep_unshared: bool,
) -> Result<u64>
where
    A: ReadableTable<&'static [u8], &'static [u8]> + ReadableTableMetadata,
    B: ReadableTable<&'static [u8], &'static [u8]> + ReadableTableMetadata,
{
    let mut count = 0;

    for item in first.raw_entries()? {
        let (hash, bytes) = item?;
        match second.get(&hash)? {
            Some(other) => {
                let mut entry = Entry::decode(&bytes)?;
                entry.merge(&other);
                target.put(&hash, &entry)?;
            }
            None if keep_unshared => target.put_raw(&hash, &bytes)?,
            None => continue,
        }
        count += 1;
    }

    if keep_unshared {
        for item in second.raw_entries()? {
            let (hash, bytes) = item?;
            if first.contains(&hash)? {
                continue;
            }
            target.put_raw(&hash, &bytes)?;
            count += 1;
        }
    }

    Ok(count)
}

fn subtract_into<A, B>(
    first: &Namespace<A>,
    second: &Namespace<B>,
    target: &mut Namespace<HashTable<'_>>,
) -> Result<u64>
where
    A: ReadableTable<&'static [u8], &'static [u8]> + ReadableTableMetadata,
    B: ReadableTable<&'static [u8], &'static [u8]> + ReadableTableMetadata,
{
    let mut count = 0;
    for item in first.raw_entries()? {
        let (hash, bytes) = item?;
        if !second.contains(&hash)? {
            target.put_raw(&hash, &bytes)?;
            count += 1;
        }
    }
    Ok(count)
}
