//! Visual Studio discovery and MSVC environment extraction.
//!
//! cl.exe only works inside the environment that `vcvarsall.bat` sets up
//! (INCLUDE, LIB, LIBPATH and a PATH pointing at the right host/target
//! tools). We run the script followed by an environment dump and parse the
//! dump into a fresh [`ToolchainEnvironment`].

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::{parse_environment_dump, Platform, ToolchainEnvironment};
use crate::util::process::{Executor, ProcessBuilder};
use crate::util::shell::{Shell, Status};

/// Variable vcvarsall.bat sets and a plain shell never has.
pub const MARKER_VARIABLE: &str = "INCLUDE";

/// Installation roots checked when vswhere is unavailable or reports nothing.
pub const KNOWN_VS_ROOTS: &[&str] = &[
    "C:/Program Files/Microsoft Visual Studio/2022/Community",
    "C:/Program Files/Microsoft Visual Studio/2022/Professional",
    "C:/Program Files/Microsoft Visual Studio/2022/Enterprise",
    "C:/Program Files (x86)/Microsoft Visual Studio/2019/Community",
    "C:/Program Files (x86)/Microsoft Visual Studio/2019/Professional",
    "C:/Program Files (x86)/Microsoft Visual Studio/2019/Enterprise",
];

/// A Visual Studio installation carrying the C++ tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsvcInstallation {
    pub path: PathBuf,
}

impl MsvcInstallation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        MsvcInstallation { path: path.into() }
    }

    /// `VC/Auxiliary/Build/vcvarsall.bat`
    pub fn vcvarsall(&self) -> PathBuf {
        self.path
            .join("VC")
            .join("Auxiliary")
            .join("Build")
            .join("vcvarsall.bat")
    }

    /// Directories where the bundled clang-cl lives.
    pub fn llvm_bin_dirs(&self) -> Vec<PathBuf> {
        let llvm = self.path.join("VC").join("Tools").join("Llvm");
        vec![llvm.join("x64").join("bin"), llvm.join("bin")]
    }
}

/// Map a CPU architecture name to the vcvarsall.bat argument.
pub fn target_arch(cpu: &str) -> Option<&'static str> {
    match cpu {
        "x86_64" => Some("x64"),
        "x86" => Some("x86"),
        "aarch64" => Some("arm64"),
        _ => None,
    }
}

/// Finds Visual Studio installations with vswhere.
pub struct MsvcLocator<'a> {
    exec: &'a dyn Executor,
    component: String,
    known_roots: Vec<PathBuf>,
}

impl<'a> MsvcLocator<'a> {
    pub fn new(exec: &'a dyn Executor, component: &str) -> Self {
        MsvcLocator {
            exec,
            component: component.to_string(),
            known_roots: KNOWN_VS_ROOTS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Replace the fallback installation roots.
    pub fn with_known_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.known_roots = roots;
        self
    }

    pub fn known_roots(&self) -> &[PathBuf] {
        &self.known_roots
    }

    /// Find vswhere.exe in the installer directory, then on PATH.
    pub fn find_vswhere(&self, env: &ToolchainEnvironment) -> Option<PathBuf> {
        for var in ["ProgramFiles(x86)", "ProgramFiles"] {
            let Some(base) = env.get(var) else {
                continue;
            };
            let candidate = PathBuf::from(base)
                .join("Microsoft Visual Studio")
                .join("Installer")
                .join("vswhere.exe");
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        self.exec.find_program("vswhere", env)
    }

    /// Ask vswhere for the latest installation with the required component.
    pub fn query_vswhere(&self, env: &ToolchainEnvironment) -> Option<MsvcInstallation> {
        let Some(vswhere) = self.find_vswhere(env) else {
            tracing::debug!("vswhere.exe not found");
            return None;
        };
        tracing::debug!("Found vswhere at: {}", vswhere.display());

        let cmd = ProcessBuilder::new(&vswhere)
            .args([
                "-latest",
                "-products",
                "*",
                "-requires",
                self.component.as_str(),
                "-property",
                "installationPath",
            ])
            .environment(env);

        match self.exec.output(&cmd) {
            Ok(out) if out.success() => match out.first_line() {
                Some(path) => Some(MsvcInstallation::new(path)),
                None => {
                    tracing::debug!("vswhere returned empty path");
                    None
                }
            },
            Ok(out) => {
                tracing::debug!("vswhere failed: {}", out.stderr.trim());
                None
            }
            Err(e) => {
                tracing::debug!("Failed to run vswhere: {:#}", e);
                None
            }
        }
    }

    /// vswhere first, then the fixed list of installation roots.
    pub fn locate(&self, env: &ToolchainEnvironment) -> Option<MsvcInstallation> {
        if let Some(installation) = self.query_vswhere(env) {
            tracing::debug!("Found Visual Studio at: {}", installation.path.display());
            return Some(installation);
        }

        self.known_roots
            .iter()
            .map(MsvcInstallation::new)
            .find(|installation| installation.vcvarsall().is_file())
    }
}

/// Run `script args...` and capture the environment it leaves behind.
///
/// The dump replaces `base` entirely. On Windows hosts the script runs
/// through a temporary batch file under `cmd /c`, on other hosts it is
/// sourced by `sh`.
pub fn extract_environment(
    exec: &dyn Executor,
    script: &Path,
    args: &[&str],
    base: &ToolchainEnvironment,
    host: Platform,
) -> Result<ToolchainEnvironment> {
    if !script.is_file() {
        bail!("environment script not found: {}", script.display());
    }

    let output = if host.is_windows() {
        // A batch file sidesteps cmd.exe quoting of paths with spaces
        let mut batch = tempfile::Builder::new()
            .prefix("rigger_vcvars")
            .suffix(".bat")
            .tempfile()
            .context("failed to create temporary batch file")?;
        write!(
            batch,
            "@echo off\r\ncall \"{}\" {} >nul 2>&1\r\nif errorlevel 1 exit /b 1\r\nset\r\n",
            script.display(),
            args.join(" ")
        )
        .context("failed to write temporary batch file")?;
        let batch = batch.into_temp_path();

        let cmd = ProcessBuilder::new("cmd")
            .arg("/c")
            .arg(&*batch)
            .environment(base);
        exec.output(&cmd)?
    } else {
        let cmd = ProcessBuilder::new("sh")
            .arg("-c")
            .arg(". \"$0\" \"$@\" >/dev/null 2>&1 && env")
            .arg(script)
            .args(args)
            .environment(base);
        exec.output(&cmd)?
    };

    if !output.success() {
        bail!(
            "{} exited with code {}: {}",
            script.display(),
            output
                .code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_string()),
            output.stderr.trim()
        );
    }

    let env = parse_environment_dump(&output.stdout);
    if env.path().map_or(true, str::is_empty) {
        bail!("{} produced an empty PATH", script.display());
    }
    Ok(env)
}

/// Produce the environment MSVC builds run in.
///
/// Reuses `base` when it already is a developer prompt. Any failure is a
/// warning and yields `base` unchanged: CMake may still find the tools.
pub fn setup_environment(
    exec: &dyn Executor,
    shell: &Shell,
    installation: Option<&MsvcInstallation>,
    arch: Option<&str>,
    base: &ToolchainEnvironment,
    host: Platform,
) -> ToolchainEnvironment {
    if base.contains(MARKER_VARIABLE) && exec.find_program("cl", base).is_some() {
        shell.note("MSVC environment already configured");
        return base.clone();
    }

    let Some(installation) = installation else {
        shell.warn("Visual Studio installation not found");
        return base.clone();
    };

    let vcvarsall = installation.vcvarsall();
    if !vcvarsall.is_file() {
        shell.warn(format!("vcvarsall.bat not found at {}", vcvarsall.display()));
        return base.clone();
    }

    let Some(arch) = arch else {
        shell.warn("unsupported host architecture for vcvarsall.bat; set [msvc] arch");
        return base.clone();
    };

    tracing::info!("extracting MSVC environment via {}", vcvarsall.display());
    match extract_environment(exec, &vcvarsall, &[arch], base, host) {
        Ok(env) => {
            shell.status(Status::Finished, "MSVC environment configured");
            env
        }
        Err(e) => {
            shell.warn(format!("Failed to setup MSVC environment: {:#}", e));
            base.clone()
        }
    }
}
