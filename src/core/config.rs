//! Build configuration model.
//!
//! A run starts from a [`ConfigRequest`] (everything the user pinned, either
//! on the command line or in `Rigger.toml`) and ends with a
//! [`ResolvedConfig`] in which every field has a value. The resolver in
//! `ops::resolve` is the only place that turns one into the other.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// CMake build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
}

impl BuildType {
    /// All build types in menu order.
    pub const ALL: [BuildType; 3] = [BuildType::Debug, BuildType::RelWithDebInfo, BuildType::Release];

    /// The value passed to `CMAKE_BUILD_TYPE`.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
        }
    }

    /// Lowercase name used as a build directory component.
    pub fn dir_name(&self) -> String {
        self.as_str().to_lowercase()
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            "relwithdebinfo" => Ok(BuildType::RelWithDebInfo),
            _ => Err(format!(
                "invalid build type '{}'; expected 'Debug', 'Release', or 'RelWithDebInfo'",
                s
            )),
        }
    }
}

/// Operating system family, used both for the host and for the build
/// directory key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
    Macos,
    Unknown,
}

impl Platform {
    /// The platform this binary is running on.
    pub fn host() -> Self {
        match std::env::consts::OS {
            "linux" => Platform::Linux,
            "windows" => Platform::Windows,
            "macos" => Platform::Macos,
            _ => Platform::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Windows => "windows",
            Platform::Macos => "macos",
            Platform::Unknown => "unknown",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Windows)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            "macos" | "darwin" => Ok(Platform::Macos),
            _ => Err(format!(
                "invalid platform '{}'; expected 'linux', 'windows', or 'macos'",
                s
            )),
        }
    }
}

/// Compiler family the build generator is pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompilerId {
    /// MSVC-class toolchain (cl.exe)
    #[serde(rename = "msvc")]
    Msvc,
    /// Clang with the MSVC ABI (clang-cl.exe)
    #[serde(rename = "clang-cl")]
    ClangCl,
    #[serde(rename = "clang")]
    Clang,
    #[serde(rename = "gcc")]
    Gcc,
}

impl CompilerId {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerId::Msvc => "msvc",
            CompilerId::ClangCl => "clang-cl",
            CompilerId::Clang => "clang",
            CompilerId::Gcc => "gcc",
        }
    }

    /// Human-readable name used in menus.
    pub fn display_name(&self) -> &'static str {
        match self {
            CompilerId::Msvc => "MSVC",
            CompilerId::ClangCl => "Clang-CL (Windows)",
            CompilerId::Clang => "Clang",
            CompilerId::Gcc => "GCC",
        }
    }

    /// Whether this compiler can be requested on the given host. Automatic
    /// detection is narrower, see `CompilerDetector::priority`.
    pub fn supports_host(&self, host: Platform) -> bool {
        match self {
            CompilerId::Msvc | CompilerId::ClangCl => host.is_windows(),
            CompilerId::Clang | CompilerId::Gcc => true,
        }
    }
}

impl fmt::Display for CompilerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompilerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gcc" | "g++" => Ok(CompilerId::Gcc),
            "clang" | "clang++" => Ok(CompilerId::Clang),
            "clang-cl" => Ok(CompilerId::ClangCl),
            "msvc" | "cl" => Ok(CompilerId::Msvc),
            _ => Err(format!(
                "invalid compiler '{}'; expected 'gcc', 'clang', 'clang-cl', or 'msvc'",
                s
            )),
        }
    }
}

/// CMake generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneratorId {
    #[serde(rename = "Ninja")]
    Ninja,
    #[serde(rename = "Unix Makefiles")]
    UnixMakefiles,
    #[serde(rename = "MinGW Makefiles")]
    MinGwMakefiles,
    #[serde(rename = "Visual Studio 17 2022")]
    VisualStudio2022,
}

impl GeneratorId {
    /// The name passed to `cmake -G`.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorId::Ninja => "Ninja",
            GeneratorId::UnixMakefiles => "Unix Makefiles",
            GeneratorId::MinGwMakefiles => "MinGW Makefiles",
            GeneratorId::VisualStudio2022 => "Visual Studio 17 2022",
        }
    }

    /// IDE-project generators take a platform (`-A`) argument and build
    /// several configurations from one tree.
    pub fn is_ide_project(&self) -> bool {
        matches!(self, GeneratorId::VisualStudio2022)
    }
}

impl fmt::Display for GeneratorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeneratorId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ninja" => Ok(GeneratorId::Ninja),
            "unix makefiles" | "make" => Ok(GeneratorId::UnixMakefiles),
            "mingw makefiles" => Ok(GeneratorId::MinGwMakefiles),
            "visual studio 17 2022" | "vs2022" => Ok(GeneratorId::VisualStudio2022),
            _ => Err(format!(
                "invalid generator '{}'; expected 'Ninja', 'Unix Makefiles', 'MinGW Makefiles', or 'Visual Studio 17 2022'",
                s
            )),
        }
    }
}

/// What the user asked for. `None` means "not pinned": the resolver fills it
/// from auto-detection or a prompt.
#[derive(Debug, Clone)]
pub struct ConfigRequest {
    pub project_root: PathBuf,
    pub build_type: Option<BuildType>,
    pub compiler: Option<CompilerId>,
    pub generator: Option<GeneratorId>,
    pub platform: Option<Platform>,
    pub build_tests: Option<bool>,
    pub use_dependency_manager: Option<bool>,
    pub clean: bool,
    pub interactive: bool,
    pub extra_args: Vec<String>,
}

impl ConfigRequest {
    /// A request with nothing pinned.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        ConfigRequest {
            project_root: project_root.into(),
            build_type: None,
            compiler: None,
            generator: None,
            platform: None,
            build_tests: None,
            use_dependency_manager: None,
            clean: false,
            interactive: true,
            extra_args: Vec::new(),
        }
    }

    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }
}

/// Generator decision. `Default` means no `-G` flag: CMake picks its
/// platform default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorChoice {
    Default,
    Explicit(GeneratorId),
}

impl GeneratorChoice {
    pub fn generator(&self) -> Option<GeneratorId> {
        match self {
            GeneratorChoice::Default => None,
            GeneratorChoice::Explicit(id) => Some(*id),
        }
    }
}

impl fmt::Display for GeneratorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorChoice::Default => f.write_str("CMake default"),
            GeneratorChoice::Explicit(id) => write!(f, "{}", id),
        }
    }
}

/// A fully resolved configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub project_root: PathBuf,
    pub build_root: String,
    pub build_type: BuildType,
    pub compiler: CompilerId,
    pub generator: GeneratorChoice,
    pub platform: Platform,
    pub build_tests: bool,
    pub use_dependency_manager: bool,
    pub clean: bool,
    pub interactive: bool,
    pub extra_args: Vec<String>,
}

impl ResolvedConfig {
    /// `<root>/<build_root>/<buildtype>/<platform>`
    pub fn build_dir(&self) -> PathBuf {
        build_dir_for(&self.project_root, &self.build_root, self.build_type, self.platform)
    }
}

/// Build directory keyed by build type and platform.
pub fn build_dir_for(
    project_root: &Path,
    build_root: &str,
    build_type: BuildType,
    platform: Platform,
) -> PathBuf {
    project_root
        .join(build_root)
        .join(build_type.dir_name())
        .join(platform.as_str())
}
