//! Dependency installation.
//!
//! Two strategies, chosen by the dependency-manager flag:
//! - [`system`]: one native OS package manager
//! - [`conan`]: the project-level dependency manager
//!
//! [`checks`] verifies the prerequisites both strategies rely on.

pub mod checks;
pub mod conan;
pub mod system;

pub use checks::{run_checks, CheckReport, CheckResult};
pub use conan::{ConanInstall, ConanManager};
pub use system::{detect_manager, PackageManager, SystemOutcome, SystemPackages};
