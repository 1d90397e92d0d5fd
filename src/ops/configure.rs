//! Implementation of `rigger configure`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::{BuildInvoker, CMakeSettings};
use crate::core::{ConfigRequest, ResolvedConfig, RigError};
use crate::deps::{ConanInstall, ConanManager};
use crate::ops::resolve::{ConfigurationResolver, Resolution};
use crate::util::context::GlobalContext;
use crate::util::fs::remove_dir_all_if_exists;
use crate::util::process::cpu_count;
use crate::util::prompt::Prompt;
use crate::util::shell::{Shell, Status};

/// Options for the configure command.
#[derive(Debug, Clone)]
pub struct ConfigureOptions {
    /// Everything pinned on the command line
    pub request: ConfigRequest,

    /// Conan profile file overriding automatic selection
    pub profile: Option<PathBuf>,

    /// Install Conan without asking when it is missing
    pub install_conan: bool,

    /// Run `cmake --build` after configuring
    pub build: bool,

    /// Parallel jobs for the optional build
    pub jobs: Option<usize>,
}

impl ConfigureOptions {
    pub fn new(request: ConfigRequest) -> Self {
        ConfigureOptions {
            request,
            profile: None,
            install_conan: false,
            build: false,
            jobs: None,
        }
    }
}

/// Resolve, optionally install Conan dependencies, then configure CMake.
pub fn configure(
    ctx: &GlobalContext<'_>,
    options: ConfigureOptions,
    prompt: &mut dyn Prompt,
) -> Result<ResolvedConfig> {
    let shell = ctx.shell();
    let ConfigureOptions {
        request,
        profile,
        install_conan,
        build,
        jobs,
    } = options;

    if let Some(ref profile) = profile {
        if !profile.is_file() {
            return Err(RigError::path_validation("Conan profile", profile).into());
        }
    }

    shell.header("C++ Project Configuration");
    let resolution = ConfigurationResolver::new(ctx).resolve(request, prompt)?;
    let config = &resolution.config;
    print_summary(shell, config);

    let build_dir = config.build_dir();
    if config.clean && remove_dir_all_if_exists(&build_dir)? {
        shell.status(Status::Removed, build_dir.display());
    }

    if config.use_dependency_manager {
        install_conan_dependencies(ctx, &resolution, profile.as_deref(), install_conan, prompt)?;
    }

    let settings = CMakeSettings::new(&ctx.config().cmake, ctx.host());
    let invoker = BuildInvoker::new(ctx.exec(), shell, settings);
    invoker.configure(config, &resolution.overrides, &resolution.environment)?;

    if build {
        let jobs = jobs.unwrap_or_else(cpu_count);
        invoker.build(&build_dir, config.build_type, jobs, &[], &resolution.environment)?;
    } else {
        shell.note(format!("Build with: rigger build -t {}", config.build_type));
    }

    Ok(resolution.config)
}

fn install_conan_dependencies(
    ctx: &GlobalContext<'_>,
    resolution: &Resolution,
    explicit_profile: Option<&Path>,
    install_conan: bool,
    prompt: &mut dyn Prompt,
) -> Result<()> {
    let config = &resolution.config;
    let conan = ConanManager::new(
        ctx.exec(),
        ctx.shell(),
        &resolution.environment,
        &ctx.config().conan,
    );
    conan.ensure_installed(config.interactive, install_conan, prompt)?;
    conan.detect_profile()?;

    let version = resolution.compiler_version(ctx.exec());
    let profile = conan.select_profile(
        &config.project_root,
        Some(config.compiler),
        version.as_ref(),
        explicit_profile,
    );

    conan.install(&ConanInstall {
        project_root: config.project_root.clone(),
        output_dir: config.build_dir(),
        profile,
        build_type: conan.host_build_type(config.build_type),
    })
}

/// Print the resolved configuration.
pub fn print_summary(shell: &Shell, config: &ResolvedConfig) {
    shell.header("Configuration Summary");
    shell.summary_row("Build Type", config.build_type);
    shell.summary_row("Compiler", config.compiler.display_name());
    shell.summary_row("Build System", config.generator);
    shell.summary_row("Platform", config.platform);
    shell.summary_row("Build Tests", config.build_tests);
    shell.summary_row("Use Conan", config.use_dependency_manager);
    shell.summary_row("Build Dir", config.build_dir().display());
}
