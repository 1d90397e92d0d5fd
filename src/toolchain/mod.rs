//! Compiler discovery.
//!
//! - [`probe`]: presence and version checks for any tool
//! - [`detect`]: compiler enumeration, selection and environment preparation
//! - [`msvc`]: Visual Studio location and `vcvarsall.bat` environment extraction

pub mod detect;
pub mod msvc;
pub mod probe;

use std::path::PathBuf;

use crate::core::{CompilerId, Platform};

pub use detect::{CompilerDetector, DetectedCompiler};
pub use msvc::{MsvcInstallation, MsvcLocator};
pub use probe::ToolProbe;

/// The machine rigger runs on.
///
/// Detection never asks the OS directly, so Windows discovery can be
/// exercised from any host in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub platform: Platform,
    /// CPU architecture as reported by `std::env::consts::ARCH`
    pub arch: String,
}

impl Host {
    pub fn new(platform: Platform, arch: impl Into<String>) -> Self {
        Host {
            platform,
            arch: arch.into(),
        }
    }

    pub fn current() -> Self {
        Host::new(Platform::host(), std::env::consts::ARCH)
    }
}

/// Where a compiler candidate was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOrigin {
    /// On the search path of the base environment
    OnPath(PathBuf),
    /// In a known installation directory that is not on PATH yet
    InstallRoot(PathBuf),
    /// Provided by a Visual Studio installation
    VisualStudio(MsvcInstallation),
}

/// A compiler that is usable on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerCandidate {
    pub id: CompilerId,
    pub display_name: &'static str,
    /// `None` when the compiler works on every platform
    pub platform_constraint: Option<Platform>,
    pub origin: CandidateOrigin,
}

impl CompilerCandidate {
    pub fn new(id: CompilerId, origin: CandidateOrigin) -> Self {
        let platform_constraint = match id {
            CompilerId::Msvc | CompilerId::ClangCl => Some(Platform::Windows),
            CompilerId::Clang | CompilerId::Gcc => None,
        };
        CompilerCandidate {
            id,
            display_name: id.display_name(),
            platform_constraint,
            origin,
        }
    }
}

/// Compiler executables handed to CMake.
///
/// MSVC needs none: the generator and the developer environment already
/// pick cl.exe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompilerOverrides {
    pub c_compiler: Option<&'static str>,
    pub cxx_compiler: Option<&'static str>,
}

impl CompilerOverrides {
    pub fn for_compiler(id: CompilerId) -> Self {
        let (c, cxx) = match id {
            CompilerId::Gcc => ("gcc", "g++"),
            CompilerId::Clang => ("clang", "clang++"),
            CompilerId::ClangCl => ("clang-cl", "clang-cl"),
            CompilerId::Msvc => return CompilerOverrides::default(),
        };
        CompilerOverrides {
            c_compiler: Some(c),
            cxx_compiler: Some(cxx),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.c_compiler.is_none() && self.cxx_compiler.is_none()
    }
}
