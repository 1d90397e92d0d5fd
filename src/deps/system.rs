//! Native OS package managers.
//!
//! Exactly one manager is used: the first of [`PackageManager::PRIORITY`]
//! whose executable is on PATH. Managers are never combined.

use std::fmt;

use anyhow::Result;

use crate::core::ToolchainEnvironment;
use crate::util::config::RiggerConfig;
use crate::util::process::{Executor, ProcessBuilder};
use crate::util::prompt::{self, Prompt};
use crate::util::shell::{Shell, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    Apt,
    Dnf,
    Yum,
    Pacman,
    Zypper,
    Brew,
    Choco,
    Scoop,
}

impl PackageManager {
    /// Detection order.
    pub const PRIORITY: [PackageManager; 8] = [
        PackageManager::Apt,
        PackageManager::Dnf,
        PackageManager::Yum,
        PackageManager::Pacman,
        PackageManager::Zypper,
        PackageManager::Brew,
        PackageManager::Choco,
        PackageManager::Scoop,
    ];

    /// Key used in the `[packages]` config table.
    pub fn key(&self) -> &'static str {
        match self {
            PackageManager::Apt => "apt",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
            PackageManager::Brew => "brew",
            PackageManager::Choco => "choco",
            PackageManager::Scoop => "scoop",
        }
    }

    /// Executable probed on PATH.
    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Apt => "apt-get",
            other => other.key(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PackageManager::Apt => "Debian/Ubuntu",
            PackageManager::Dnf | PackageManager::Yum => "Fedora/RHEL",
            PackageManager::Pacman => "Arch Linux",
            PackageManager::Zypper => "openSUSE",
            PackageManager::Brew => "macOS",
            PackageManager::Choco | PackageManager::Scoop => "Windows",
        }
    }

    /// Linux managers need root.
    pub fn uses_sudo(&self) -> bool {
        matches!(
            self,
            PackageManager::Apt
                | PackageManager::Dnf
                | PackageManager::Yum
                | PackageManager::Pacman
                | PackageManager::Zypper
        )
    }

    /// Build tools every C++ project needs.
    pub fn base_packages(&self) -> &'static [&'static str] {
        match self {
            PackageManager::Apt => &["build-essential", "cmake", "ninja-build", "git", "pkg-config"],
            PackageManager::Dnf | PackageManager::Yum => {
                &["gcc", "gcc-c++", "cmake", "ninja-build", "git", "pkg-config"]
            }
            PackageManager::Pacman => &["base-devel", "cmake", "ninja", "git", "pkg-config"],
            PackageManager::Zypper => &["gcc-c++", "cmake", "ninja", "git", "pkg-config"],
            PackageManager::Brew => &["cmake", "ninja", "pkg-config"],
            PackageManager::Choco | PackageManager::Scoop => &["cmake", "ninja", "git"],
        }
    }

    /// Non-interactive install arguments, without the package list.
    pub fn install_args(&self) -> &'static [&'static str] {
        match self {
            PackageManager::Apt => &["install", "-y"],
            PackageManager::Dnf => &["install", "-y"],
            PackageManager::Yum => &["install", "-y"],
            PackageManager::Pacman => &["-S", "--needed", "--noconfirm"],
            PackageManager::Zypper => &["--non-interactive", "install"],
            PackageManager::Brew => &["install"],
            PackageManager::Choco => &["install", "-y"],
            PackageManager::Scoop => &["install"],
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// First manager whose executable is on PATH.
pub fn detect_manager(exec: &dyn Executor, env: &ToolchainEnvironment) -> Option<PackageManager> {
    let found = PackageManager::PRIORITY
        .into_iter()
        .find(|m| exec.find_program(m.program(), env).is_some());
    tracing::debug!("package manager: {:?}", found);
    found
}

/// What happened during a system dependency run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemOutcome {
    Installed,
    /// The install command ran and failed; reported, not fatal
    Failed(Option<i32>),
    /// The equivalent manual command was printed instead
    Manual,
}

/// Installs the project's system packages with one manager.
pub struct SystemPackages<'a> {
    exec: &'a dyn Executor,
    shell: &'a Shell,
    env: &'a ToolchainEnvironment,
    manager: PackageManager,
    packages: Vec<String>,
}

impl<'a> SystemPackages<'a> {
    pub fn new(
        exec: &'a dyn Executor,
        shell: &'a Shell,
        env: &'a ToolchainEnvironment,
        manager: PackageManager,
        config: &RiggerConfig,
    ) -> Self {
        let mut packages: Vec<String> = manager
            .base_packages()
            .iter()
            .map(|p| p.to_string())
            .collect();
        for extra in config.packages_for(manager.key()) {
            if !packages.contains(extra) {
                packages.push(extra.clone());
            }
        }

        SystemPackages {
            exec,
            shell,
            env,
            manager,
            packages,
        }
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// The install command for the whole package list.
    pub fn install_command(&self) -> ProcessBuilder {
        let sudo = self.manager.uses_sudo() && self.exec.find_program("sudo", self.env).is_some();
        let cmd = if sudo {
            ProcessBuilder::new("sudo").arg(self.manager.program())
        } else {
            ProcessBuilder::new(self.manager.program())
        };
        cmd.args(self.manager.install_args())
            .args(&self.packages)
            .environment(self.env)
    }

    /// The command printed when the user installs by hand.
    pub fn manual_command(&self) -> String {
        let mut parts = Vec::new();
        if self.manager.uses_sudo() {
            parts.push("sudo");
        }
        parts.push(self.manager.program());
        parts.push(match self.manager {
            PackageManager::Pacman => "-S",
            _ => "install",
        });
        parts.extend(self.packages.iter().map(String::as_str));
        parts.join(" ")
    }

    /// Run the install. Failure is reported and returned, never raised.
    pub fn install(&self) -> Result<SystemOutcome> {
        self.shell.status(
            Status::Installing,
            format!("packages for {}", self.manager.description()),
        );

        if self.manager == PackageManager::Brew {
            return self.install_brew();
        }

        let code = self.exec.status(&self.install_command())?;
        if code != Some(0) {
            self.shell.error(format!(
                "Failed to install packages (exit code {})",
                code.map_or_else(|| "none".to_string(), |c| c.to_string())
            ));
            return Ok(SystemOutcome::Failed(code));
        }

        self.shell.status(Status::Finished, "packages installed");
        Ok(SystemOutcome::Installed)
    }

    /// Homebrew fails on already-installed formulae; install only the
    /// missing ones.
    fn install_brew(&self) -> Result<SystemOutcome> {
        let mut failed = None;
        for package in &self.packages {
            let list = ProcessBuilder::new("brew")
                .arg("list")
                .arg(package)
                .environment(self.env);
            if self.exec.output(&list)?.success() {
                tracing::debug!("{} already installed", package);
                continue;
            }

            self.shell.status(Status::Installing, package);
            let install = ProcessBuilder::new("brew")
                .arg("install")
                .arg(package)
                .environment(self.env);
            let code = self.exec.status(&install)?;
            if code != Some(0) {
                self.shell.warn(format!("brew install {} failed", package));
                failed = Some(code);
            }
        }

        match failed {
            Some(code) => Ok(SystemOutcome::Failed(code)),
            None => {
                self.shell.status(Status::Finished, "packages installed");
                Ok(SystemOutcome::Installed)
            }
        }
    }

    fn print_manual(&self) {
        self.shell.status(
            Status::Info,
            format!("Recommended packages for {}:", self.manager.description()),
        );
        self.shell.plain(format!("  {}", self.manual_command()));
    }

    /// Ask, then install or print the manual command.
    pub fn run(&self, interactive: bool, prompt: &mut dyn Prompt) -> Result<SystemOutcome> {
        let auto_install = interactive
            && prompt::confirm(
                prompt,
                self.shell,
                "Do you want to automatically install system dependencies?",
                true,
            )?;

        if auto_install {
            self.install()
        } else {
            self.print_manual();
            Ok(SystemOutcome::Manual)
        }
    }
}

/// Shown when no package manager is available.
pub fn print_manual_list(shell: &Shell, config: &RiggerConfig) {
    shell.status(Status::Info, "Please install the following dependencies manually:");
    shell.plain("  - Build tools (cmake, ninja, git, pkg-config)");
    shell.plain("  - A C++ compiler");
    for library in &config.optional {
        shell.plain(format!("  - {}", library.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockExecutor, MockProcessOutput, ScriptedPrompt};

    fn config_with(manager: &str, extra: &[&str]) -> RiggerConfig {
        let mut config = RiggerConfig::default();
        config.packages.insert(
            manager.to_string(),
            extra.iter().map(|s| s.to_string()).collect(),
        );
        config
    }

    #[test]
    fn test_detect_priority() {
        let env = ToolchainEnvironment::default();

        let exec = MockExecutor::new().with_programs(&["pacman", "brew", "apt-get"]);
        assert_eq!(detect_manager(&exec, &env), Some(PackageManager::Apt));

        let exec = MockExecutor::new().with_programs(&["scoop", "choco"]);
        assert_eq!(detect_manager(&exec, &env), Some(PackageManager::Choco));

        // apt itself is not the probed binary
        let exec = MockExecutor::new().with_program("apt");
        assert_eq!(detect_manager(&exec, &env), None);
    }

    #[test]
    fn test_packages_include_configured_extras() {
        let exec = MockExecutor::new();
        let shell = Shell::quiet();
        let env = ToolchainEnvironment::default();
        let config = config_with("apt", &["libboost-all-dev", "cmake"]);

        let system = SystemPackages::new(&exec, &shell, &env, PackageManager::Apt, &config);
        assert_eq!(system.packages().last().unwrap(), "libboost-all-dev");
        assert_eq!(system.packages().iter().filter(|p| *p == "cmake").count(), 1);
    }

    #[test]
    fn test_install_command_with_sudo() {
        let exec = MockExecutor::new().with_programs(&["pacman", "sudo"]);
        let shell = Shell::quiet();
        let env = ToolchainEnvironment::default();
        let system = SystemPackages::new(&exec, &shell, &env, PackageManager::Pacman, &RiggerConfig::default());

        assert_eq!(
            system.install_command().display_command(),
            "sudo pacman -S --needed --noconfirm base-devel cmake ninja git pkg-config"
        );
        assert_eq!(
            system.manual_command(),
            "sudo pacman -S base-devel cmake ninja git pkg-config"
        );
    }

    #[test]
    fn test_install_command_without_sudo() {
        let exec = MockExecutor::new().with_program("zypper");
        let shell = Shell::quiet();
        let env = ToolchainEnvironment::default();
        let system = SystemPackages::new(&exec, &shell, &env, PackageManager::Zypper, &RiggerConfig::default());

        assert!(system
            .install_command()
            .display_command()
            .starts_with("zypper --non-interactive install gcc-c++"));
    }

    #[test]
    fn test_declined_prints_manual_command() {
        let exec = MockExecutor::new().with_program("apt-get");
        let shell = Shell::quiet();
        let env = ToolchainEnvironment::default();
        let system = SystemPackages::new(&exec, &shell, &env, PackageManager::Apt, &RiggerConfig::default());

        let mut prompt = ScriptedPrompt::new(["n"]);
        assert_eq!(system.run(true, &mut prompt).unwrap(), SystemOutcome::Manual);
        assert_eq!(
            prompt.questions(),
            ["Do you want to automatically install system dependencies? [Y/n] "]
        );
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn test_non_interactive_never_installs() {
        let exec = MockExecutor::new().with_program("dnf");
        let shell = Shell::quiet();
        let env = ToolchainEnvironment::default();
        let system = SystemPackages::new(&exec, &shell, &env, PackageManager::Dnf, &RiggerConfig::default());

        let mut prompt = ScriptedPrompt::silent();
        assert_eq!(system.run(false, &mut prompt).unwrap(), SystemOutcome::Manual);
        assert!(prompt.questions().is_empty());
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn test_install_failure_is_reported_not_raised() {
        let exec = MockExecutor::new().with_program("apt-get");
        exec.expect_prefix("apt-get install -y", MockProcessOutput::failure(100, "E: lock"));
        let shell = Shell::quiet();
        let env = ToolchainEnvironment::default();
        let system = SystemPackages::new(&exec, &shell, &env, PackageManager::Apt, &RiggerConfig::default());

        let mut prompt = ScriptedPrompt::new([""]);
        assert_eq!(
            system.run(true, &mut prompt).unwrap(),
            SystemOutcome::Failed(Some(100))
        );
    }

    #[test]
    fn test_brew_installs_only_missing() {
        let exec = MockExecutor::new().with_program("brew");
        exec.expect("brew list cmake", MockProcessOutput::success("cmake\n"));
        exec.expect("brew list ninja", MockProcessOutput::failure(1, "Error: No such keg"));
        exec.expect("brew list pkg-config", MockProcessOutput::success(""));
        exec.expect("brew install ninja", MockProcessOutput::success(""));
        let shell = Shell::quiet();
        let env = ToolchainEnvironment::default();
        let system = SystemPackages::new(&exec, &shell, &env, PackageManager::Brew, &RiggerConfig::default());

        assert_eq!(system.install().unwrap(), SystemOutcome::Installed);
        assert_eq!(exec.calls_starting_with("brew install"), vec!["brew install ninja"]);
    }
}
