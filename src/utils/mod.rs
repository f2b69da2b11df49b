pub mod environment;

pub use environment::{DEFAULT_STORE_FILE, STORE_ENV, store_path};
