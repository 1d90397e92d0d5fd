//! Build-system layer: generator selection and CMake invocation.

pub mod cmake;
pub mod cmake_cache;
pub mod generator;

pub use cmake::{BuildInvoker, CMakeSettings};
pub use cmake_cache::CMakeCache;
pub use generator::BuildSystemSelector;
