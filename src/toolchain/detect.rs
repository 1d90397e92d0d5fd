//! Compiler detection.
//!
//! Candidates are enumerated in a fixed priority order:
//! 1. Windows: MSVC (via vswhere), clang-cl (PATH or known install roots), GCC
//! 2. Elsewhere: Clang, GCC
//!
//! The first candidate is the default both for the interactive menu and for
//! non-interactive runs.

use std::path::PathBuf;

use crate::core::{CompilerId, Platform, RigError, ToolchainEnvironment};
use crate::toolchain::msvc::{self, MsvcInstallation, MsvcLocator};
use crate::toolchain::{CandidateOrigin, CompilerCandidate, CompilerOverrides, Host};
use crate::util::config::MsvcConfig;
use crate::util::process::Executor;
use crate::util::prompt::{self, Prompt};
use crate::util::shell::{Shell, Status};

/// Standalone LLVM installations searched for clang-cl.
pub const KNOWN_LLVM_ROOTS: &[&str] = &["C:/Program Files/LLVM/bin", "C:/Program Files (x86)/LLVM/bin"];

/// Outcome of compiler resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedCompiler {
    pub compiler: CompilerId,
    pub overrides: CompilerOverrides,
    /// Environment every later subprocess runs with
    pub environment: ToolchainEnvironment,
}

/// Finds, selects and prepares C++ compilers.
pub struct CompilerDetector<'a> {
    exec: &'a dyn Executor,
    shell: &'a Shell,
    host: Host,
    locator: MsvcLocator<'a>,
    llvm_roots: Vec<PathBuf>,
    msvc_arch: Option<String>,
}

impl<'a> CompilerDetector<'a> {
    pub fn new(exec: &'a dyn Executor, shell: &'a Shell, host: Host, config: &MsvcConfig) -> Self {
        let msvc_arch = config
            .arch
            .clone()
            .or_else(|| msvc::target_arch(&host.arch).map(str::to_string));

        CompilerDetector {
            exec,
            shell,
            host,
            locator: MsvcLocator::new(exec, config.component()),
            llvm_roots: KNOWN_LLVM_ROOTS.iter().map(PathBuf::from).collect(),
            msvc_arch,
        }
    }

    /// Replace the fixed Visual Studio and LLVM search roots.
    pub fn with_known_roots(mut self, vs_roots: Vec<PathBuf>, llvm_roots: Vec<PathBuf>) -> Self {
        self.locator = self.locator.with_known_roots(vs_roots);
        self.llvm_roots = llvm_roots;
        self
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Architecture argument for vcvarsall.bat.
    pub fn msvc_arch(&self) -> Option<&str> {
        self.msvc_arch.as_deref()
    }

    /// Locate Visual Studio. Always `None` off Windows.
    pub fn msvc_installation(&self, env: &ToolchainEnvironment) -> Option<MsvcInstallation> {
        if !self.host.platform.is_windows() {
            return None;
        }
        self.locator.locate(env)
    }

    /// Compilers in the order they are offered.
    pub fn priority(&self) -> &'static [CompilerId] {
        if self.host.platform.is_windows() {
            &[CompilerId::Msvc, CompilerId::ClangCl, CompilerId::Gcc]
        } else {
            &[CompilerId::Clang, CompilerId::Gcc]
        }
    }

    /// Every available compiler, highest priority first.
    pub fn candidates(
        &self,
        env: &ToolchainEnvironment,
        msvc: Option<&MsvcInstallation>,
    ) -> Vec<CompilerCandidate> {
        self.shell.status(Status::Detecting, "C++ compilers");
        self.priority()
            .iter()
            .filter_map(|&id| self.probe(id, env, msvc))
            .collect()
    }

    /// Look for one specific compiler.
    pub fn probe(
        &self,
        id: CompilerId,
        env: &ToolchainEnvironment,
        msvc: Option<&MsvcInstallation>,
    ) -> Option<CompilerCandidate> {
        let origin = match id {
            CompilerId::Msvc => CandidateOrigin::VisualStudio(msvc?.clone()),
            CompilerId::ClangCl => self.find_clang_cl(env, msvc)?,
            CompilerId::Clang => CandidateOrigin::OnPath(self.exec.find_program("clang++", env)?),
            CompilerId::Gcc => CandidateOrigin::OnPath(self.exec.find_program("g++", env)?),
        };
        Some(CompilerCandidate::new(id, origin))
    }

    fn find_clang_cl(
        &self,
        env: &ToolchainEnvironment,
        msvc: Option<&MsvcInstallation>,
    ) -> Option<CandidateOrigin> {
        if let Some(path) = self.exec.find_program("clang-cl", env) {
            return Some(CandidateOrigin::OnPath(path));
        }

        self.shell
            .note("clang-cl not in PATH, searching common locations...");

        let vs_dirs = msvc
            .into_iter()
            .cloned()
            .chain(self.locator.known_roots().iter().map(MsvcInstallation::new))
            .flat_map(|installation| installation.llvm_bin_dirs());

        let found = vs_dirs
            .chain(self.llvm_roots.iter().cloned())
            .find(|dir| dir.join("clang-cl.exe").is_file());

        match found {
            Some(dir) => {
                self.shell.status(
                    Status::Found,
                    format!("clang-cl at {}", dir.join("clang-cl.exe").display()),
                );
                Some(CandidateOrigin::InstallRoot(dir))
            }
            None => {
                tracing::debug!("clang-cl not found in common locations");
                None
            }
        }
    }

    /// Pick one candidate. A menu is shown only when there is a real choice
    /// and the run is interactive.
    pub fn choose(
        &self,
        mut candidates: Vec<CompilerCandidate>,
        interactive: bool,
        prompt: &mut dyn Prompt,
    ) -> Result<CompilerCandidate, RigError> {
        if candidates.is_empty() {
            return Err(RigError::ToolNotFound {
                what: "C++ compiler".to_string(),
                hints: install_hints(self.host.platform),
            });
        }

        let index = if interactive && candidates.len() > 1 {
            let items: Vec<String> = candidates
                .iter()
                .map(|c| c.display_name.to_string())
                .collect();
            prompt::select(prompt, self.shell, "Available compilers:", "compiler", &items, 0)?
        } else {
            0
        };

        Ok(candidates.swap_remove(index))
    }

    /// Build the overrides and environment for the chosen compiler.
    ///
    /// `candidate` is `None` when the user named a compiler that detection
    /// could not find; the choice is passed through to CMake as-is.
    pub fn prepare(
        &self,
        id: CompilerId,
        candidate: Option<&CompilerCandidate>,
        base: &ToolchainEnvironment,
    ) -> DetectedCompiler {
        let origin = candidate.map(|c| &c.origin);
        let environment = match (id, origin) {
            (CompilerId::Msvc, origin) => {
                let installation = match origin {
                    Some(CandidateOrigin::VisualStudio(installation)) => Some(installation),
                    _ => None,
                };
                msvc::setup_environment(
                    self.exec,
                    self.shell,
                    installation,
                    self.msvc_arch(),
                    base,
                    self.host.platform,
                )
            }
            (_, Some(CandidateOrigin::InstallRoot(dir))) => {
                tracing::info!("prepending {} to PATH", dir.display());
                base.with_path_prepended(dir)
            }
            _ => base.clone(),
        };

        DetectedCompiler {
            compiler: id,
            overrides: CompilerOverrides::for_compiler(id),
            environment,
        }
    }
}

/// How to get a compiler on each platform.
pub fn install_hints(platform: Platform) -> Vec<String> {
    let hints: &[&str] = match platform {
        Platform::Windows => &[
            "Install Visual Studio 2022 with the \"Desktop development with C++\" workload",
            "Or install LLVM for clang-cl: choco install llvm",
            "Or install MinGW-w64 for GCC: choco install mingw",
        ],
        Platform::Macos => &[
            "Install the Xcode command line tools: xcode-select --install",
            "Or install GCC: brew install gcc",
        ],
        Platform::Linux | Platform::Unknown => &[
            "Ubuntu/Debian: sudo apt-get install build-essential",
            "Fedora: sudo dnf install gcc-c++",
            "Arch: sudo pacman -S base-devel",
        ],
    };
    hints.iter().map(|h| h.to_string()).collect()
}
