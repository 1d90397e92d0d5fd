//! Conan, the project-level dependency manager.
//!
//! A nonzero exit from `conan install` is fatal. Nothing here falls back
//! to system packages within the same run.

use std::path::{Path, PathBuf};

use anyhow::Result;
use semver::{Version, VersionReq};

use crate::core::{BuildType, CompilerId, RigError, ToolchainEnvironment};
use crate::util::config::ConanConfig;
use crate::util::fs::ensure_dir;
use crate::util::process::{Executor, ProcessBuilder};
use crate::util::prompt::{self, Prompt};
use crate::util::shell::{Shell, Status};

/// Profile name Conan falls back to.
pub const DEFAULT_PROFILE: &str = "default";

/// Interpreters tried, in order, for `-m pip install`.
const PYTHONS: &[&str] = &["python3", "python", "py"];

/// A fully decided `conan install`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConanInstall {
    pub project_root: PathBuf,
    pub output_dir: PathBuf,
    pub profile: String,
    /// Build type requested for host packages
    pub build_type: BuildType,
}

pub struct ConanManager<'a> {
    exec: &'a dyn Executor,
    shell: &'a Shell,
    env: &'a ToolchainEnvironment,
    config: &'a ConanConfig,
}

impl<'a> ConanManager<'a> {
    pub fn new(
        exec: &'a dyn Executor,
        shell: &'a Shell,
        env: &'a ToolchainEnvironment,
        config: &'a ConanConfig,
    ) -> Self {
        ConanManager {
            exec,
            shell,
            env,
            config,
        }
    }

    pub fn is_available(&self) -> bool {
        self.exec.find_program("conan", self.env).is_some()
    }

    /// `conan --version`, when conan runs.
    pub fn version(&self) -> Option<String> {
        if !self.is_available() {
            return None;
        }
        let cmd = ProcessBuilder::new("conan").arg("--version").environment(self.env);
        match self.exec.output(&cmd) {
            Ok(output) if output.success() => output.first_line().map(str::to_string),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("conan --version: {:#}", e);
                None
            }
        }
    }

    /// Make sure conan is installed, installing it through pip when the
    /// user agrees (or `auto_install` is set).
    pub fn ensure_installed(
        &self,
        interactive: bool,
        auto_install: bool,
        prompt: &mut dyn Prompt,
    ) -> Result<()> {
        if let Some(version) = self.version() {
            self.shell.status(Status::Found, version);
            return Ok(());
        }

        let install = auto_install
            || (interactive
                && prompt::confirm(prompt, self.shell, "Conan not found. Install it now?", true)?);
        if !install {
            return Err(RigError::ToolNotFound {
                what: "Conan".to_string(),
                hints: vec![
                    "pip install conan".to_string(),
                    "Or re-run with --install-conan".to_string(),
                ],
            }
            .into());
        }

        let python = PYTHONS
            .iter()
            .find(|p| self.exec.find_program(p, self.env).is_some())
            .ok_or_else(|| RigError::ToolNotFound {
                what: "Python interpreter".to_string(),
                hints: vec!["Install Python 3 to bootstrap Conan".to_string()],
            })?;

        self.shell.status(Status::Installing, "Conan via pip");
        let cmd = ProcessBuilder::new(python)
            .args(["-m", "pip", "install", "--user", "conan"])
            .environment(self.env);
        let command = cmd.display_command();
        let output = self.exec.output(&cmd)?;
        if !output.success() {
            tracing::warn!("pip failed: {}", output.stderr.trim());
            return Err(RigError::Subprocess {
                command,
                code: output.code,
            }
            .into());
        }

        self.shell.status(Status::Finished, "Conan installed");
        Ok(())
    }

    /// `conan profile detect --force`. Failure only warns, including a
    /// conan that cannot be started at all.
    pub fn detect_profile(&self) -> Result<()> {
        self.shell.status(Status::Detecting, "Conan profile");
        let cmd = ProcessBuilder::new("conan")
            .args(["profile", "detect", "--force"])
            .environment(self.env);
        match self.exec.output(&cmd) {
            Ok(output) if output.success() => {}
            Ok(output) => {
                tracing::debug!("conan profile detect: {}", output.stderr.trim());
                self.shell
                    .warn("Failed to detect Conan profile, using default");
            }
            Err(e) => {
                tracing::debug!("conan profile detect: {:#}", e);
                self.shell
                    .warn("Failed to run conan profile detect, using default");
            }
        }
        Ok(())
    }

    /// Pick the profile for a compiler.
    ///
    /// An explicit profile always wins. Otherwise the first rule whose
    /// compiler matches, whose version requirement accepts `version` and
    /// whose profile file exists under the profiles directory is used.
    pub fn select_profile(
        &self,
        project_root: &Path,
        compiler: Option<CompilerId>,
        version: Option<&Version>,
        explicit: Option<&Path>,
    ) -> String {
        if let Some(path) = explicit {
            return path.display().to_string();
        }

        let (Some(compiler), Some(version)) = (compiler, version) else {
            return DEFAULT_PROFILE.to_string();
        };

        let profiles_dir = project_root.join(self.config.profiles_dir());
        for rule in self.config.profile_rules() {
            if rule.compiler != compiler {
                continue;
            }

            let req = match VersionReq::parse(&rule.version) {
                Ok(req) => req,
                Err(e) => {
                    tracing::warn!("ignoring profile rule '{}': {}", rule.name, e);
                    continue;
                }
            };
            if !req.matches(version) {
                continue;
            }

            let path = profiles_dir.join(&rule.name);
            if path.is_file() {
                self.shell.note(format!(
                    "Using profile {} for {} {}",
                    path.display(),
                    compiler.display_name(),
                    version
                ));
                return path.display().to_string();
            }
            tracing::debug!("profile {} does not exist", path.display());
        }

        DEFAULT_PROFILE.to_string()
    }

    /// Build type requested for dependencies. RelWithDebInfo reuses
    /// Release binaries unless disabled in the config.
    pub fn host_build_type(&self, build_type: BuildType) -> BuildType {
        if build_type == BuildType::RelWithDebInfo && self.config.remap_relwithdebinfo() {
            self.shell
                .note("Using Release dependencies for RelWithDebInfo build");
            BuildType::Release
        } else {
            build_type
        }
    }

    pub fn install_command(&self, install: &ConanInstall) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new("conan")
            .arg("install")
            .arg(&install.project_root)
            .arg("--output-folder")
            .arg(&install.output_dir);

        for policy in self.config.build_policies() {
            cmd = cmd.arg(format!("--build={}", policy));
        }

        cmd.arg(format!("--profile={}", install.profile))
            .arg(format!("-s:h=build_type={}", install.build_type))
            .cwd(&install.project_root)
            .environment(self.env)
    }

    /// Run `conan install` once. Nonzero is fatal.
    pub fn install(&self, install: &ConanInstall) -> Result<()> {
        self.shell.header("Installing Conan Dependencies");
        ensure_dir(&install.output_dir)?;

        let cmd = self.install_command(install);
        let command = cmd.display_command();
        self.shell.status(Status::Running, &command);

        let code = self.exec.status(&cmd)?;
        if code != Some(0) {
            return Err(RigError::Subprocess { command, code }.into());
        }

        self.shell
            .status(Status::Finished, "Conan dependencies installed");
        Ok(())
    }
}
