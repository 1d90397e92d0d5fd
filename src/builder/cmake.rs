//! CMake configure and build invocation.

use std::path::Path;

use anyhow::Result;

use crate::core::{BuildType, GeneratorChoice, ResolvedConfig, RigError, ToolchainEnvironment};
use crate::toolchain::{CompilerOverrides, Host};
use crate::util::config::CmakeConfig;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::ensure_dir;
use crate::util::process::{Executor, ProcessBuilder};
use crate::util::shell::{Shell, Status};

/// Toolchain file the Conan CMakeToolchain generator writes.
pub const TOOLCHAIN_FILE: &str = "conan_toolchain.cmake";

/// Project-level knobs of the configure command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMakeSettings {
    /// Cache variable set ON/OFF from the tests flag
    pub tests_option: String,
    /// Cache variable set ON/OFF from the dependency-manager flag
    pub conan_option: Option<String>,
    /// Value for `-A` with IDE-project generators
    pub platform_arch: &'static str,
}

impl CMakeSettings {
    pub fn new(config: &CmakeConfig, host: &Host) -> Self {
        CMakeSettings {
            tests_option: config.tests_option().to_string(),
            conan_option: config.conan_option.clone(),
            platform_arch: vs_platform(&host.arch),
        }
    }
}

/// Visual Studio platform name for a CPU architecture.
pub fn vs_platform(cpu: &str) -> &'static str {
    match cpu {
        "x86" => "Win32",
        "aarch64" => "ARM64",
        _ => "x64",
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

/// Runs CMake for a resolved configuration.
pub struct BuildInvoker<'a> {
    exec: &'a dyn Executor,
    shell: &'a Shell,
    settings: CMakeSettings,
}

impl<'a> BuildInvoker<'a> {
    pub fn new(exec: &'a dyn Executor, shell: &'a Shell, settings: CMakeSettings) -> Self {
        BuildInvoker {
            exec,
            shell,
            settings,
        }
    }

    /// Assemble the configure command.
    ///
    /// The toolchain file is only passed when it exists; a missing one is
    /// reported and the define omitted.
    pub fn configure_command(
        &self,
        config: &ResolvedConfig,
        overrides: &CompilerOverrides,
    ) -> ProcessBuilder {
        let build_dir = config.build_dir();
        let mut cmd = ProcessBuilder::new("cmake");

        // Generator
        if let GeneratorChoice::Explicit(generator) = config.generator {
            cmd = cmd.arg("-G").arg(generator.as_str());
            if generator.is_ide_project() {
                cmd = cmd.arg("-A").arg(self.settings.platform_arch);
            }
        }

        // Compilers
        if let Some(cc) = overrides.c_compiler {
            cmd = cmd.arg(format!("-DCMAKE_C_COMPILER={}", cc));
        }
        if let Some(cxx) = overrides.cxx_compiler {
            cmd = cmd.arg(format!("-DCMAKE_CXX_COMPILER={}", cxx));
        }

        cmd = cmd.arg(format!("-DCMAKE_BUILD_TYPE={}", config.build_type));
        cmd = cmd.arg(format!(
            "-D{}={}",
            self.settings.tests_option,
            on_off(config.build_tests)
        ));

        // Dependency manager
        if config.use_dependency_manager {
            let toolchain = build_dir.join(TOOLCHAIN_FILE);
            if toolchain.is_file() {
                cmd = cmd.arg(format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain.display()));
                if let Some(ref option) = self.settings.conan_option {
                    cmd = cmd.arg(format!("-D{}=ON", option));
                }
            } else {
                self.shell.diagnostic(&missing_toolchain(&toolchain));
            }
        } else if let Some(ref option) = self.settings.conan_option {
            cmd = cmd.arg(format!("-D{}=OFF", option));
        }

        cmd = cmd.args(&config.extra_args);

        cmd.arg("-S")
            .arg(&config.project_root)
            .arg("-B")
            .arg(&build_dir)
            .cwd(&config.project_root)
    }

    /// Run the configure step once. A nonzero exit is returned as
    /// [`RigError::Subprocess`] carrying the tool's code.
    pub fn configure(
        &self,
        config: &ResolvedConfig,
        overrides: &CompilerOverrides,
        env: &ToolchainEnvironment,
    ) -> Result<()> {
        self.shell.header("Configuring CMake");
        let build_dir = config.build_dir();
        ensure_dir(&build_dir)?;
        self.shell.status(Status::Configuring, build_dir.display());

        let cmd = self.configure_command(config, overrides).environment(env);
        self.run(cmd)?;

        self.shell
            .status(Status::Finished, "CMake configuration successful");
        Ok(())
    }

    /// Run `cmake --build` once.
    pub fn build(
        &self,
        build_dir: &Path,
        build_type: BuildType,
        jobs: usize,
        targets: &[String],
        env: &ToolchainEnvironment,
    ) -> Result<()> {
        self.shell
            .status(Status::Building, format!("{} ({})", build_dir.display(), build_type));

        let cmd = build_command(build_dir, build_type, jobs, targets).environment(env);
        self.run(cmd)?;

        self.shell.status(Status::Finished, "build successful");
        Ok(())
    }

    fn run(&self, cmd: ProcessBuilder) -> Result<()> {
        let command = cmd.display_command();
        self.shell.status(Status::Running, &command);

        let code = self.exec.status(&cmd)?;
        if code != Some(0) {
            return Err(RigError::Subprocess { command, code }.into());
        }
        Ok(())
    }
}

/// Warning for a dependency-manager run whose toolchain file is absent.
pub fn missing_toolchain(toolchain: &Path) -> Diagnostic {
    Diagnostic::warning("Conan toolchain file not found")
        .with_location(toolchain)
        .with_context("configuring without CMAKE_TOOLCHAIN_FILE")
        .with_suggestion(suggestions::MISSING_TOOLCHAIN_FILE)
}

/// `cmake --build <dir> --config <type> --parallel <jobs> [--target ...]`
pub fn build_command(
    build_dir: &Path,
    build_type: BuildType,
    jobs: usize,
    targets: &[String],
) -> ProcessBuilder {
    let mut cmd = ProcessBuilder::new("cmake")
        .arg("--build")
        .arg(build_dir)
        .arg("--config")
        .arg(build_type.as_str())
        .arg("--parallel")
        .arg(jobs.to_string());

    if !targets.is_empty() {
        cmd = cmd.arg("--target").args(targets);
    }
    cmd
}
