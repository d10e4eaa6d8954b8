//! Command-line interface for now-playing.

mod commands;

pub use commands::{Cli, run};
