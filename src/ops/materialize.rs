//! Materialization of an index into a deduplicated, content-addressed tree
//!
//! Layout: `<root>/<hex(b0)>/<hex(b1)>/<hex hash><ext>`, where `ext` is the extension of the
//! entry's lexicographically first path. Attachments land next to it as
//! `<hex hash><attachment ext>`.
//!
//! Every file is written to a temporary file in its shard directory and renamed into place,
//! so a destination path either doesn't exist or holds complete content. Primary content is
//! re-hashed while it is copied; a mismatch means the source changed after indexing and the
//! run stops with [`Error::StaleIndex`].

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

use chrono::{DateTime, Utc};
use filetime::FileTime;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, IoResultExt, Result, require_non_empty};
use crate::models::{ContentHash, Entry, HashingReader};
use crate::store::Store;

const TEMP_PREFIX: &str = ".venndex-tmp-";

/// Receives a callback per entry while an index is materialized
pub trait MaterializeObserver {
    /// `copied` is false when the destination already existed and the entry was skipped
    fn entry_done(&mut self, _hash: &ContentHash, _copied: bool) {}
}

impl MaterializeObserver for () {}

/// Summary of one materialization run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MaterializeReport {
    pub entries_copied: u64,
    pub entries_skipped: u64,
    pub attachments_copied: u64,
}

/// Copy every entry of `index` into the content-addressed tree under `root`
///
/// Entries whose destination already exists are skipped, so re-running after a failure only
/// copies what is missing.
///
/// # Errors
///
/// Returns an error if:
/// - `index` or `root` is empty, or the index doesn't exist
/// - a source file changed since it was indexed ([`Error::StaleIndex`])
/// - any directory or file cannot be created, read, written or renamed
pub fn materialize(
    store: &Store,
    index: &str,
    root: &Path,
    observer: &mut impl MaterializeObserver,
) -> Result<MaterializeReport> {
    require_non_empty(index, "index name")?;
    if root.as_os_str().is_empty() {
        return Err(Error::InvalidArgument("root path cannot be empty".to_string()));
    }

    let report = store.read(|tx| {
        let ns = tx.namespace(index)?;
        let mut report = MaterializeReport::default();

        for item in ns.entries()? {
            let (hash, entry) = item?;
            match materialize_entry(&hash, &entry, root)? {
                Some(attachments) => {
                    report.entries_copied += 1;
                    report.attachments_copied += attachments;
                    observer.entry_done(&hash, true);
                }
                None => {
                    report.entries_skipped += 1;
                    observer.entry_done(&hash, false);
                }
            }
        }

        Ok(report)
    })?;

    info!(
        index,
        root = %root.display(),
        copied = report.entries_copied,
        skipped = report.entries_skipped,
        attachments = report.attachments_copied,
        "index materialized"
    );
    Ok(report)
}

/// Materialize one entry, returning the number of attachments copied, or `None` if the
/// destination already existed
fn materialize_entry(hash: &ContentHash, entry: &Entry, root: &Path) -> Result<Option<u64>> {
    let dir = hash.shard_dir(root);
    fs::create_dir_all(&dir).at_path(&dir)?;

    let src = entry
        .representative_path()
        .ok_or_else(|| Error::InvalidEntry(format!("entry {hash} has no paths")))?;
    let dst = dir.join(hash.file_name(&entry.representative_extension()));

    if dst.try_exists().at_path(&dst)? {
        debug!(source = src, destination = %dst.display(), "skipping existing file");
        return Ok(None);
    }

    copy_verified(hash, Path::new(src), &dst, entry.timestamp)?;

    let mut attachments = 0;
    for (ext, attachment) in &entry.attachments {
        let attachment_dst = dir.join(hash.file_name(ext));
        copy_atomic(Path::new(attachment), &attachment_dst)?;
        attachments += 1;
    }

    debug!(source = src, destination = %dst.display(), attachments, "materialized entry");
    Ok(Some(attachments))
}

fn temp_file_beside(dst: &Path) -> Result<NamedTempFile> {
    let dir = dst.parent().unwrap_or(Path::new("."));
    tempfile::Builder::new().prefix(TEMP_PREFIX).tempfile_in(dir).at_path(dir)
}

fn persist(tmp: NamedTempFile, dst: &Path) -> Result<()> {
    tmp.persist(dst).map_err(|e| Error::io(dst, e.error))?;
    Ok(())
}

/// Copy `src` to `dst` while re-hashing it, publishing only if the hash still matches
fn copy_verified(
    expected: &ContentHash,
    src: &Path,
    dst: &Path,
    timestamp: DateTime<Utc>,
) -> Result<()> {
    let input = File::open(src).at_path(src)?;
    let mut reader = HashingReader::new(BufReader::new(input));

    // Dropping `tmp` on any early return removes the temporary file
    let mut tmp = temp_file_beside(dst)?;
    io::copy(&mut reader, tmp.as_file_mut()).at_path(src)?;

    let actual = reader.finish();
    if actual != *expected {
        return Err(Error::StaleIndex { hash: *expected, path: src.to_path_buf() });
    }

    persist(tmp, dst)?;

    let time = FileTime::from_system_time(timestamp.into());
    filetime::set_file_times(dst, time, time).at_path(dst)?;
    Ok(())
}

/// Copy `src` to `dst` through a temporary file, without any content check
fn copy_atomic(src: &Path, dst: &Path) -> Result<()> {
    let mut input = File::open(src).at_path(src)?;
    let mut tmp = temp_file_beside(dst)?;
    io::copy(&mut input, tmp.as_file_mut()).at_path(src)?;
    persist(tmp, dst)
}
