//! Rigger - build environment resolution for native C++ projects
//!
//! This crate decides which compiler, generator, build type and dependency
//! strategy a CMake project is built with, prepares the toolchain
//! environment (including MSVC developer variables), installs dependencies
//! and drives CMake.

pub mod builder;
pub mod core;
pub mod deps;
pub mod ops;
pub mod toolchain;
pub mod util;

/// Test utilities and mocks for rigger unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted process executor, a scripted
/// prompt, and project fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{BuildType, CompilerId, ConfigRequest, GeneratorChoice, Platform, ResolvedConfig, RigError};
pub use util::context::GlobalContext;
