//! Progress bars for long-running commands
//!
//! Bars draw to stderr and are hidden automatically when stderr is not a terminal, so piping
//! command output stays clean.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

use crate::indexer::IndexObserver;
use crate::models::ContentHash;
use crate::ops::MaterializeObserver;

const BAR_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// A progress bar of `total` steps, or a hidden one when `quiet`
pub fn bar(total: u64, message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    let pb = ProgressBar::new(total);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Advances a bar once per file seen by the indexer
pub struct IndexProgress {
    bar: ProgressBar,
}

impl IndexProgress {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl IndexObserver for IndexProgress {
    fn file_indexed(&mut self, _path: &Path) {
        self.bar.inc(1);
    }

    fn file_skipped(&mut self, _path: &Path) {
        self.bar.inc(1);
    }
}

/// Advances a bar once per materialized entry
pub struct MaterializeProgress {
    bar: ProgressBar,
}

impl MaterializeProgress {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl MaterializeObserver for MaterializeProgress {
    fn entry_done(&mut self, _hash: &ContentHash, _copied: bool) {
        self.bar.inc(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_progress_counts_every_file() {
        let mut progress = IndexProgress::new(bar(3, "indexing", true));
        progress.file_indexed(Path::new("/a"));
        progress.file_skipped(Path::new("/a.json"));
        progress.file_indexed(Path::new("/b"));
        assert_eq!(progress.bar.position(), 3);
    }

    #[test]
    fn test_materialize_progress() {
        let mut progress = MaterializeProgress::new(bar(2, "copying", true));
        progress.entry_done(&ContentHash::from_bytes([0; 32]), true);
        progress.entry_done(&ContentHash::from_bytes([1; 32]), false);
        assert_eq!(progress.bar.position(), 2);
        progress.finish();
    }
}
