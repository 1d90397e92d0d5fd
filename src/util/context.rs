//! Global context for rigger operations.
//!
//! Bundles everything one run shares: the process executor, the shell, the
//! host description, the base environment snapshot, and the merged
//! configuration of the project being worked on.
//!
//! Nothing here reads ambient state after construction. Tests build a
//! context with an empty environment and a mock executor so detection
//! never sees the real machine.

use std::path::{Path, PathBuf};

use crate::core::{RigError, ToolchainEnvironment};
use crate::toolchain::detect::KNOWN_LLVM_ROOTS;
use crate::toolchain::msvc::KNOWN_VS_ROOTS;
use crate::toolchain::{CompilerDetector, Host};
use crate::util::config::{load_project_config, RiggerConfig};
use crate::util::fs::normalize_path;
use crate::util::process::Executor;
use crate::util::shell::Shell;

/// Shared state of one rigger invocation.
pub struct GlobalContext<'a> {
    exec: &'a dyn Executor,
    shell: &'a Shell,

    /// Directory containing the top-level CMakeLists.txt
    project_root: PathBuf,

    host: Host,

    /// Environment every subprocess starts from
    environment: ToolchainEnvironment,

    config: RiggerConfig,

    /// Visual Studio installation roots tried when vswhere fails
    vs_roots: Vec<PathBuf>,

    /// Standalone LLVM directories searched for clang-cl
    llvm_roots: Vec<PathBuf>,
}

impl<'a> GlobalContext<'a> {
    /// Create a context for the project at `project_root`.
    ///
    /// The directory must exist. Configuration is loaded from
    /// `~/.rigger/config.toml` and `<root>/Rigger.toml`.
    pub fn new(
        exec: &'a dyn Executor,
        shell: &'a Shell,
        project_root: &Path,
    ) -> Result<Self, RigError> {
        if !project_root.is_dir() {
            return Err(RigError::path_validation("source directory", project_root));
        }
        let project_root = normalize_path(project_root);
        let config = load_project_config(&project_root);

        Ok(GlobalContext {
            exec,
            shell,
            project_root,
            host: Host::current(),
            environment: ToolchainEnvironment::from_current(),
            config,
            vs_roots: KNOWN_VS_ROOTS.iter().map(PathBuf::from).collect(),
            llvm_roots: KNOWN_LLVM_ROOTS.iter().map(PathBuf::from).collect(),
        })
    }

    /// Pretend to run on another host.
    pub fn with_host(mut self, host: Host) -> Self {
        self.host = host;
        self
    }

    /// Replace the base environment snapshot.
    pub fn with_environment(mut self, environment: ToolchainEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// Replace the loaded configuration.
    pub fn with_config(mut self, config: RiggerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the fixed Visual Studio and LLVM search roots.
    pub fn with_known_roots(mut self, vs_roots: Vec<PathBuf>, llvm_roots: Vec<PathBuf>) -> Self {
        self.vs_roots = vs_roots;
        self.llvm_roots = llvm_roots;
        self
    }

    pub fn exec(&self) -> &'a dyn Executor {
        self.exec
    }

    pub fn shell(&self) -> &'a Shell {
        self.shell
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn environment(&self) -> &ToolchainEnvironment {
        &self.environment
    }

    pub fn config(&self) -> &RiggerConfig {
        &self.config
    }

    /// A compiler detector for this host and configuration.
    pub fn detector(&self) -> CompilerDetector<'a> {
        CompilerDetector::new(self.exec, self.shell, self.host.clone(), &self.config.msvc)
            .with_known_roots(self.vs_roots.clone(), self.llvm_roots.clone())
    }
}
