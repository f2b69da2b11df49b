//! Timestamp extraction from Google Photos Takeout JSON sidecars
//!
//! A Takeout archive stores `IMG_0001.jpg` next to `IMG_0001.jpg.json`, whose
//! `photoTakenTime.timestamp` holds the capture time as decimal Unix seconds in a string.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{Error, IoResultExt, Result};

/// Extension of a metadata sidecar, with its dot
pub const SIDECAR_EXT: &str = ".json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TakeoutMetadata {
    #[serde(default)]
    photo_taken_time: Option<TakenTime>,
}

#[derive(Debug, Deserialize)]
struct TakenTime {
    #[serde(default)]
    timestamp: String,
}

/// Read the capture time recorded in a sidecar
pub fn read_taken_time(path: &Path) -> Result<DateTime<Utc>> {
    let file = File::open(path).at_path(path)?;
    let metadata: TakeoutMetadata = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| sidecar_error(path, format!("invalid JSON: {e}")))?;

    let raw = metadata.photo_taken_time.map(|t| t.timestamp).unwrap_or_default();
    if raw.is_empty() {
        return Err(sidecar_error(path, "photo taken timestamp is empty"));
    }

    let secs: i64 =
        raw.trim().parse().map_err(|e| sidecar_error(path, format!("bad timestamp {raw:?}: {e}")))?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| sidecar_error(path, format!("timestamp {secs} out of range")))
}

/// Sidecar path for a content file: `<path>.json`
pub fn sidecar_for(content_path: &str) -> String {
    format!("{content_path}{SIDECAR_EXT}")
}

/// Content file a sidecar describes, if `path` looks like a sidecar
pub fn companion_of(path: &str) -> Option<&str> {
    path.strip_suffix(SIDECAR_EXT).filter(|base| !base.is_empty())
}

fn sidecar_error(path: &Path, reason: impl Into<String>) -> Error {
    Error::Sidecar { path: path.to_path_buf(), reason: reason.into() }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_sidecar(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("IMG_0001.jpg.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_taken_time() {
        let dir = TempDir::new().unwrap();
        let path = write_sidecar(
            &dir,
            r#"{
                "title": "IMG_0001.jpg",
                "creationTime": {"timestamp": "1700000000"},
                "photoTakenTime": {"timestamp": "1234567890", "formatted": "Feb 13, 2009"}
            }"#,
        );

        let ts = read_taken_time(&path).unwrap();
        assert_eq!(ts, DateTime::from_timestamp(1_234_567_890, 0).unwrap());
    }

    #[test]
    fn test_missing_taken_time() {
        let dir = TempDir::new().unwrap();
        let path = write_sidecar(&dir, r#"{"title": "IMG_0001.jpg"}"#);
        let err = read_taken_time(&path).unwrap_err();
        assert!(matches!(err, Error::Sidecar { .. }));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_invalid_json_and_number() {
        let dir = TempDir::new().unwrap();
        let path = write_sidecar(&dir, "{not json");
        assert!(matches!(read_taken_time(&path), Err(Error::Sidecar { .. })));

        let path = write_sidecar(&dir, r#"{"photoTakenTime": {"timestamp": "yesterday"}}"#);
        assert!(matches!(read_taken_time(&path), Err(Error::Sidecar { .. })));
    }

    #[test]
    fn test_missing_file() {
        let err = read_taken_time(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_companion_paths() {
        assert_eq!(sidecar_for("/t/IMG_1.jpg"), "/t/IMG_1.jpg.json");
        assert_eq!(companion_of("/t/IMG_1.jpg.json"), Some("/t/IMG_1.jpg"));
        assert_eq!(companion_of("/t/IMG_1.jpg"), None);
        assert_eq!(companion_of(".json"), None);
    }
}
