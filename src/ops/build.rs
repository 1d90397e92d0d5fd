//! Implementation of `rigger build`.

use anyhow::Result;

use crate::builder::{BuildInvoker, CMakeCache, CMakeSettings};
use crate::core::error::BUILD_DIRECTORY;
use crate::core::{build_dir_for, BuildType, Platform, RigError};
use crate::toolchain::msvc;
use crate::util::context::GlobalContext;
use crate::util::process::cpu_count;
use crate::util::shell::Status;

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub build_type: BuildType,

    /// Platform component of the build directory, host by default
    pub platform: Option<Platform>,

    /// Parallel jobs, CPU count by default
    pub jobs: Option<usize>,

    /// Targets to build, all when empty
    pub targets: Vec<String>,
}

/// Build an already configured tree.
///
/// Trees configured for cl.exe on Windows get the MSVC environment again,
/// since it does not survive between runs.
pub fn build(ctx: &GlobalContext<'_>, options: &BuildOptions) -> Result<()> {
    let shell = ctx.shell();
    let build_dir = build_dir_for(
        ctx.project_root(),
        ctx.config().cmake.build_root(),
        options.build_type,
        options.platform.unwrap_or(ctx.host().platform),
    );

    let Some(cache) = CMakeCache::load(&build_dir)? else {
        return Err(RigError::path_validation(BUILD_DIRECTORY, &build_dir).into());
    };
    if let Some(generator) = cache.generator() {
        shell.status(Status::Found, format!("{} build in {}", generator, build_dir.display()));
    }

    let env = if cache.uses_msvc() && ctx.host().platform.is_windows() {
        let detector = ctx.detector();
        let installation = detector.msvc_installation(ctx.environment());
        msvc::setup_environment(
            ctx.exec(),
            shell,
            installation.as_ref(),
            detector.msvc_arch(),
            ctx.environment(),
            ctx.host().platform,
        )
    } else {
        ctx.environment().clone()
    };

    let settings = CMakeSettings::new(&ctx.config().cmake, ctx.host());
    let invoker = BuildInvoker::new(ctx.exec(), shell, settings);
    let jobs = options.jobs.unwrap_or_else(cpu_count);
    invoker.build(&build_dir, options.build_type, jobs, &options.targets, &env)
}
