//! Read-side views of the store, plus chunking and deletion of whole indexes

use std::collections::BTreeMap;

use tracing::info;

use crate::error::{Error, Result, require_non_empty};
use crate::models::{ContentHash, Entry};
use crate::store::{HashTable, Namespace, Store};

/// Names of every index in the store, in lexicographic order
pub fn list_indexes(store: &Store) -> Result<Vec<String>> {
    store.read(|tx| tx.index_names())
}

/// Every entry of `index`, in hash order
pub fn entries(store: &Store, index: &str) -> Result<Vec<(ContentHash, Entry)>> {
    store.read(|tx| tx.namespace(index)?.entries()?.collect())
}

pub fn entry_count(store: &Store, index: &str) -> Result<u64> {
    store.read(|tx| tx.namespace(index)?.len())
}

/// Aggregate figures for one index
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of distinct contents
    pub hash_count: u64,
    /// Number of recorded paths across all entries
    pub file_count: u64,
    /// Entries known under more than one path
    pub duplicate_hashes: u64,
    /// Bytes of unique content
    pub total_bytes: u64,
    /// Entry count per content type
    pub content_types: BTreeMap<String, u64>,
}

impl IndexStats {
    fn add(&mut self, entry: &Entry) {
        let paths = entry.paths.len() as u64;
        self.hash_count += 1;
        self.file_count += paths;
        if paths > 1 {
            self.duplicate_hashes += 1;
        }
        self.total_bytes += entry.size;
        *self.content_types.entry(entry.content_type.clone()).or_default() += 1;
    }
}

/// Compute [`IndexStats`] for `index` in one pass
pub fn stats(store: &Store, index: &str) -> Result<IndexStats> {
    store.read(|tx| {
        let mut stats = IndexStats::default();
        for item in tx.namespace(index)?.entries()? {
            let (_, entry) = item?;
            stats.add(&entry);
        }
        Ok(stats)
    })
}

/// Outcome of [`chunk`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChunkReport {
    /// Names of the indexes created, in order
    pub chunks: Vec<String>,
    /// Entries copied across all chunks
    pub entries: u64,
}

/// Split `index` into new indexes `<prefix>-0`, `<prefix>-1`, … of at most `chunk_size`
/// entries each
///
/// Entries are copied verbatim in hash order. All chunks are written in one transaction, so
/// either every chunk exists afterwards or none does. An empty source produces no chunks.
///
/// # Errors
///
/// Returns an error if:
/// - `chunk_size` is zero, or `index` or `prefix` is empty
/// - `index` doesn't exist
/// - any chunk name is already taken ([`Error::TargetAlreadyExists`])
pub fn chunk(store: &Store, index: &str, prefix: &str, chunk_size: u64) -> Result<ChunkReport> {
    require_non_empty(index, "index name")?;
    require_non_empty(prefix, "chunk prefix")?;
    if chunk_size == 0 {
        return Err(Error::InvalidArgument("chunk size must be positive".to_string()));
    }

    let report = store.write(|tx| {
        let source = tx.existing_namespace(index)?;
        let mut report = ChunkReport::default();
        let mut current: Option<Namespace<HashTable<'_>>> = None;
        let mut filled = 0;

        for item in source.raw_entries()? {
            let (hash, bytes) = item?;

            if current.is_none() || filled == chunk_size {
                let name = format!("{prefix}-{}", report.chunks.len());
                if tx.exists(&name)? {
                    return Err(Error::TargetAlreadyExists(name));
                }
                // Close the previous chunk before opening the next
                drop(current.take());
                current = Some(tx.namespace(&name)?);
                report.chunks.push(name);
                filled = 0;
            }

            if let Some(out) = current.as_mut() {
                out.put_raw(&hash, &bytes)?;
            }
            filled += 1;
            report.entries += 1;
        }

        Ok(report)
    })?;

    info!(index, prefix, chunks = report.chunks.len(), entries = report.entries, "index chunked");
    Ok(report)
}

/// Remove `index` and all of its entries
pub fn delete_index(store: &Store, index: &str) -> Result<()> {
    store.delete(index)
}
