//! Command implementations

pub mod build;
pub mod completions;
pub mod configure;
pub mod deps;

use std::path::PathBuf;

/// `--source`, or the current directory.
pub fn source_dir(source: Option<PathBuf>) -> PathBuf {
    source.unwrap_or_else(|| PathBuf::from("."))
}
