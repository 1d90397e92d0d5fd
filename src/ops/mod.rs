//! High-level operations.
//!
//! This module contains the implementation of rigger commands.

pub mod build;
pub mod configure;
pub mod install_deps;
pub mod resolve;

pub use build::{build, BuildOptions};
pub use configure::{configure, print_summary, ConfigureOptions};
pub use install_deps::{install_deps, DepsOptions};
pub use resolve::{apply_defaults, validate_request, ConfigurationResolver, Resolution};
