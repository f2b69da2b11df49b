//! Index builder: walks a directory tree and merges every regular file into an index.
//!
//! The whole walk runs inside one write transaction. Any unreadable file, hashing error or
//! walk error aborts the run and nothing is committed, so an index never ends up holding a
//! silently partial view of a tree.

use std::fs::{self, File, Metadata};
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, IoResultExt, Result, require_non_empty};
use crate::indexer::sidecar::{SIDECAR_EXT, companion_of, read_taken_time, sidecar_for};
use crate::indexer::sniff::detect_content_type;
use crate::models::{ContentHash, Entry};
use crate::store::{HashTable, Namespace, Store};

/// How files found by the walk are turned into entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// Every regular file is indexed on its own
    Files,
    /// Google Photos Takeout: `X.json` sidecars are attached to their content file `X`
    Takeout,
}

/// Receives progress callbacks while a tree is indexed
pub trait IndexObserver {
    fn file_indexed(&mut self, _path: &Path) {}

    /// A sidecar was skipped because its content file will carry it
    fn file_skipped(&mut self, _path: &Path) {}
}

impl IndexObserver for () {}

/// Summary of one indexing run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub files_indexed: u64,
    /// Sidecars not indexed on their own because a content file carries them
    pub sidecars_skipped: u64,
    /// Sidecars whose timestamp was applied and which were registered as attachments
    pub sidecars_attached: u64,
    /// Hashes that were not in the index before this run
    pub entries_created: u64,
    /// Entries in the index after this run
    pub entry_count: u64,
}

/// Index every regular file under `root` into `index`
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use venndex::Store;
/// use venndex::indexer::index_files;
///
/// let store = Store::open("venndex.db")?;
/// let report = index_files(&store, "photos", Path::new("/home/alice/Pictures"), &mut ())?;
/// println!("{} files, {} entries", report.files_indexed, report.entry_count);
/// # Ok::<(), venndex::Error>(())
/// ```
pub fn index_files(
    store: &Store,
    index: &str,
    root: &Path,
    observer: &mut impl IndexObserver,
) -> Result<IndexReport> {
    index_tree(store, IndexMode::Files, index, root, observer)
}

/// Index a Google Photos Takeout tree, attaching JSON sidecars to their photos
pub fn index_takeout(
    store: &Store,
    index: &str,
    root: &Path,
    observer: &mut impl IndexObserver,
) -> Result<IndexReport> {
    index_tree(store, IndexMode::Takeout, index, root, observer)
}

/// Walk `root` and merge every regular file into `index` using `mode`
///
/// # Errors
///
/// Returns an error if:
/// - `index` or `root` is empty
/// - `root` cannot be canonicalized (e.g. it doesn't exist)
/// - any directory cannot be walked or any file cannot be read
/// - a path is not valid UTF-8
/// - the store cannot be written
pub fn index_tree(
    store: &Store,
    mode: IndexMode,
    index: &str,
    root: &Path,
    observer: &mut impl IndexObserver,
) -> Result<IndexReport> {
    require_non_empty(index, "index name")?;
    if root.as_os_str().is_empty() {
        return Err(Error::InvalidArgument("root path cannot be empty".to_string()));
    }
    let root = fs::canonicalize(root).at_path(root)?;

    let report = store.write(|tx| {
        let mut ns = tx.namespace(index)?;
        let mut report = IndexReport::default();

        for item in walk(&root) {
            let item = item?;
            if !item.file_type().is_file() {
                continue;
            }
            let path = item.path();

            if mode == IndexMode::Takeout && has_companion(path) {
                debug!(path = %path.display(), "skipping sidecar with companion");
                report.sidecars_skipped += 1;
                observer.file_skipped(path);
                continue;
            }

            let metadata = item.metadata()?;
            index_file(&mut ns, mode, path, &metadata, &mut report)?;
            report.files_indexed += 1;
            observer.file_indexed(path);
        }

        report.entry_count = ns.len()?;
        Ok(report)
    })?;

    info!(
        index,
        root = %root.display(),
        files = report.files_indexed,
        new_entries = report.entries_created,
        entries = report.entry_count,
        "files added to index"
    );
    Ok(report)
}

/// Count the regular files under `root`, e.g. to size a progress bar
///
/// This is a separate walk: if the tree changes before indexing, the count may be off,
/// which only affects progress display.
pub fn count_files(root: &Path) -> Result<u64> {
    let mut count = 0;
    for item in walk(root) {
        if item?.file_type().is_file() {
            count += 1;
        }
    }
    Ok(count)
}

fn walk(root: &Path) -> walkdir::IntoIter {
    WalkDir::new(root).sort_by_file_name().into_iter()
}

fn has_companion(path: &Path) -> bool {
    path.to_str().and_then(companion_of).is_some_and(|base| Path::new(base).exists())
}

/// Hash one file and merge it into the namespace, counting new entries and attached sidecars
fn index_file(
    ns: &mut Namespace<HashTable<'_>>,
    mode: IndexMode,
    path: &Path,
    metadata: &Metadata,
    report: &mut IndexReport,
) -> Result<()> {
    let path_str = path.to_str().ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;

    let mut file = File::open(path).at_path(path)?;
    let hash = ContentHash::of_reader(&mut file).at_path(path)?;

    let (mut entry, created) = match ns.get(&hash)? {
        Some(existing) => (existing, false),
        None => {
            let content_type = detect_content_type(&mut file, metadata.len()).at_path(path)?;
            let timestamp: DateTime<Utc> = metadata.modified().at_path(path)?.into();
            (Entry::new(metadata.len(), timestamp, content_type), true)
        }
    };

    entry.paths.insert(path_str.to_string());

    if mode == IndexMode::Takeout && attach_sidecar(&mut entry, path_str) {
        report.sidecars_attached += 1;
    }
    if created {
        report.entries_created += 1;
    }

    ns.put(&hash, &entry)?;
    debug!(path = path_str, %hash, created, "indexed file");
    Ok(())
}

/// Apply `<path>.json`'s capture time to the entry and register it as an attachment
///
/// Returns whether the sidecar was attached.
fn attach_sidecar(entry: &mut Entry, path: &str) -> bool {
    let sidecar = sidecar_for(path);
    if !Path::new(&sidecar).exists() {
        return false;
    }

    match read_taken_time(Path::new(&sidecar)) {
        Ok(timestamp) => {
            entry.timestamp = timestamp;
            entry.attachments.insert(SIDECAR_EXT.to_string(), sidecar);
            true
        }
        Err(e) => {
            warn!(sidecar = %sidecar, error = %e, "failed to extract timestamp from sidecar");
            false
        }
    }
}
