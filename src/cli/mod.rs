pub mod commands;
pub mod output;
pub mod progress;

pub use commands::{Cli, Commands, run};
