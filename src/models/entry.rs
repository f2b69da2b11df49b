use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use bincode::config;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Everything known about one unique file content in an index
///
/// Paths are kept in a `BTreeSet<String>` so the lexicographically first path (the one
/// materialization copies from) is always the first element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Files whose bytes hash to this entry's key
    pub paths: BTreeSet<String>,
    /// Sidecar extension (with its dot) -> sidecar path, materialized as `<hash><ext>`
    pub attachments: BTreeMap<String, String>,
    pub size: u64,
    pub timestamp: DateTime<Utc>,
    pub content_type: String,
}

impl Entry {
    /// Create an entry with no paths or attachments yet
    pub fn new(size: u64, timestamp: DateTime<Utc>, content_type: impl Into<String>) -> Self {
        Self {
            paths: BTreeSet::new(),
            attachments: BTreeMap::new(),
            size,
            timestamp,
            content_type: content_type.into(),
        }
    }

    /// Builder-style helper for adding a path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.insert(path.into());
        self
    }

    /// Fold `other` into this entry
    ///
    /// Path sets are unioned and attachments from `other` overwrite ours on the same
    /// extension. Size, timestamp and content type stay as first recorded.
    pub fn merge(&mut self, other: &Entry) {
        self.paths.extend(other.paths.iter().cloned());
        for (ext, path) in &other.attachments {
            self.attachments.insert(ext.clone(), path.clone());
        }
    }

    /// Lexicographically first path
    pub fn representative_path(&self) -> Option<&str> {
        self.paths.first().map(String::as_str)
    }

    /// Extension of [`Self::representative_path`] including the dot, or `""`
    pub fn representative_extension(&self) -> String {
        self.representative_path().map(extension_of).unwrap_or_default()
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.paths.is_empty() {
            return Err(Error::InvalidEntry("entry has no paths".to_string()));
        }
        bincode::serde::encode_to_vec(self, config::standard())
            .map_err(|e| Error::Encode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::Decode("cannot decode empty data".to_string()));
        }

        let (entry, read): (Entry, usize) =
            bincode::serde::decode_from_slice(bytes, config::standard())
                .map_err(|e| Error::Decode(e.to_string()))?;

        if read != bytes.len() {
            return Err(Error::Decode(format!(
                "{} trailing bytes after entry",
                bytes.len() - read
            )));
        }
        if entry.paths.is_empty() {
            return Err(Error::Decode("stored entry has no paths".to_string()));
        }

        Ok(entry)
    }
}

/// Suffix of the file name from its last `.`, `""` when there is none (or only a trailing dot)
///
/// Dotfiles keep their whole name: `/home/.bashrc` gives `.bashrc`.
pub fn extension_of(path: &str) -> String {
    let Some(name) = Path::new(path).file_name().and_then(|name| name.to_str()) else {
        return String::new();
    };
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => name[dot..].to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_entry() -> Entry {
        let ts = Utc.with_ymd_and_hms(2021, 6, 1, 12, 30, 0).unwrap();
        let mut entry = Entry::new(1024, ts, "image/jpeg").with_path("/a/1.jpg");
        entry.attachments.insert(".json".to_string(), "/a/1.jpg.json".to_string());
        entry
    }

    #[test]
    fn test_merge_unions_paths() {
        let ts = Utc::now();
        let mut entry = Entry::new(1, ts, "text/plain").with_path("path1").with_path("path2");
        let other = Entry::new(1, ts, "text/plain").with_path("path2").with_path("path3");

        entry.merge(&other);

        let paths: Vec<&str> = entry.paths.iter().map(String::as_str).collect();
        assert_eq!(paths, vec!["path1", "path2", "path3"]);
    }

    #[test]
    fn test_merge_attachments_last_wins() {
        let ts = Utc::now();
        let mut entry = Entry::new(1, ts, "image/jpeg").with_path("a");
        entry.attachments.insert(".json".into(), "meta1.json".into());
        entry.attachments.insert(".xmp".into(), "meta1.xmp".into());

        let mut other = Entry::new(1, ts, "image/jpeg").with_path("b");
        other.attachments.insert(".json".into(), "meta2.json".into());

        entry.merge(&other);

        assert_eq!(entry.attachments.len(), 2);
        assert_eq!(entry.attachments[".json"], "meta2.json");
        assert_eq!(entry.attachments[".xmp"], "meta1.xmp");
    }

    #[test]
    fn test_merge_keeps_first_description() {
        let first_ts = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let later_ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut entry = Entry::new(10, first_ts, "image/png").with_path("a.png");
        let other = Entry::new(99, later_ts, "application/octet-stream").with_path("b.png");

        entry.merge(&other);

        assert_eq!(entry.size, 10);
        assert_eq!(entry.timestamp, first_ts);
        assert_eq!(entry.content_type, "image/png");
        assert_eq!(entry.paths.len(), 2);
    }

    #[test]
    fn test_encode_decode() {
        let mut entry = sample_entry();
        entry.paths.insert("/b/copy.jpg".to_string());
        entry.timestamp = Utc.timestamp_opt(1_600_000_000, 123_456_789).unwrap();

        let bytes = entry.encode().unwrap();
        let decoded = Entry::decode(&bytes).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn test_encode_rejects_empty_paths() {
        let entry = Entry::new(0, Utc::now(), "text/plain");
        let err = entry.encode().unwrap_err();
        assert!(matches!(err, Error::InvalidEntry(_)));
    }

    #[test]
    fn test_decode_empty_input() {
        let err = Entry::decode(&[]).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_decode_malformed_input() {
        let bytes = sample_entry().encode().unwrap();

        let truncated = &bytes[..bytes.len() / 2];
        assert!(matches!(Entry::decode(truncated), Err(Error::Decode(_))));

        let mut trailing = bytes.clone();
        trailing.extend_from_slice(&[0, 1, 2]);
        assert!(matches!(Entry::decode(&trailing), Err(Error::Decode(_))));

        assert!(matches!(Entry::decode(&[0xff; 7]), Err(Error::Decode(_))));
    }

    #[test]
    fn test_representative_path_is_lexicographic() {
        let entry = Entry::new(1, Utc::now(), "text/plain")
            .with_path("/z/first-walked.txt")
            .with_path("/a-b/file.md")
            .with_path("/a/b/file.TXT");

        // String order, not path component order: '-' (0x2d) sorts before '/' (0x2f)
        assert_eq!(entry.representative_path(), Some("/a-b/file.md"));
        assert_eq!(entry.representative_extension(), ".md");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("/photos/IMG_0001.JPG"), ".JPG");
        assert_eq!(extension_of("/photos/archive.tar.gz"), ".gz");
        assert_eq!(extension_of("/photos/README"), "");
        assert_eq!(extension_of("/photos/trailing."), "");
        assert_eq!(extension_of("/photos/.hidden"), ".hidden");
        assert_eq!(extension_of("/home/.config.bak"), ".bak");
        assert_eq!(extension_of("/photos.d/README"), "");
    }
}
