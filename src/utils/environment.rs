use std::env;
use std::path::PathBuf;

/// Environment variable naming the store file
pub const STORE_ENV: &str = "VENNDEX_DB";

/// Store file used when nothing else is configured, relative to the working directory
pub const DEFAULT_STORE_FILE: &str = "venndex.db";

/// Resolve the store path: an explicit path wins, then `VENNDEX_DB`, then `./venndex.db`
///
/// An empty `VENNDEX_DB` counts as unset.
pub fn store_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| env::var_os(STORE_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE))
}
