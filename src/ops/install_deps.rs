//! Implementation of `rigger deps`.
//!
//! Checks prerequisites, then installs dependencies with Conan or with the
//! host's package manager. The two strategies never mix within one run.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::{build_dir_for, BuildType, CompilerId, Platform, RigError, ToolchainEnvironment};
use crate::deps::checks::run_checks;
use crate::deps::system::print_manual_list;
use crate::deps::{detect_manager, ConanInstall, ConanManager, SystemOutcome, SystemPackages};
use crate::toolchain::{DetectedCompiler, ToolProbe};
use crate::util::context::GlobalContext;
use crate::util::prompt::Prompt;
use crate::util::shell::Status;

/// Options for the deps command.
#[derive(Debug, Clone, Default)]
pub struct DepsOptions {
    /// Use Conan instead of the system package manager
    pub use_conan: bool,

    /// Build type the Conan packages are installed for
    pub build_type: BuildType,

    /// Compiler used for Conan profile selection
    pub compiler: Option<CompilerId>,

    /// Platform component of the output folder
    pub platform: Option<Platform>,

    /// Explicit Conan profile
    pub profile: Option<PathBuf>,

    /// Install Conan without asking when it is missing
    pub install_conan: bool,

    pub interactive: bool,

    /// Run the prerequisite checks only
    pub check_only: bool,
}

/// Install project dependencies.
pub fn install_deps(
    ctx: &GlobalContext<'_>,
    options: &DepsOptions,
    prompt: &mut dyn Prompt,
) -> Result<()> {
    let shell = ctx.shell();

    if let Some(ref profile) = options.profile {
        if !profile.is_file() {
            return Err(RigError::path_validation("Conan profile", profile).into());
        }
    }

    shell.header("Checking Prerequisites");
    let probe = ToolProbe::new(ctx.exec(), ctx.environment());
    let report = run_checks(&probe, ctx.host().platform, &ctx.config().optional);
    report.print(shell);
    report.into_result()?;

    if options.check_only {
        shell.note("Check-only mode, skipping installation");
        return Ok(());
    }

    if options.use_conan {
        install_with_conan(ctx, options, prompt)?;
    } else {
        install_system_packages(ctx, options, prompt)?;
    }

    shell.status(Status::Finished, "dependency setup complete");
    shell.note("Next: rigger configure");
    Ok(())
}

fn install_with_conan(
    ctx: &GlobalContext<'_>,
    options: &DepsOptions,
    prompt: &mut dyn Prompt,
) -> Result<()> {
    let detected = profile_compiler(ctx, options.compiler);
    let env = detected
        .as_ref()
        .map(|d| d.environment.clone())
        .unwrap_or_else(|| ctx.environment().clone());

    let conan = ConanManager::new(ctx.exec(), ctx.shell(), &env, &ctx.config().conan);
    conan.ensure_installed(options.interactive, options.install_conan, prompt)?;
    conan.detect_profile()?;

    let version = detected.as_ref().and_then(|d| {
        let cxx = d.overrides.cxx_compiler?;
        ToolProbe::new(ctx.exec(), &env).compiler_version(cxx)
    });
    let profile = conan.select_profile(
        ctx.project_root(),
        detected.as_ref().map(|d| d.compiler),
        version.as_ref(),
        options.profile.as_deref(),
    );

    let output_dir = build_dir_for(
        ctx.project_root(),
        ctx.config().cmake.build_root(),
        options.build_type,
        options.platform.unwrap_or(ctx.host().platform),
    );

    conan.install(&ConanInstall {
        project_root: ctx.project_root().to_path_buf(),
        output_dir,
        profile,
        build_type: conan.host_build_type(options.build_type),
    })
}

/// The compiler Conan runs against: the requested one, or the first
/// detected candidate. Its environment carries MSVC variables when needed.
fn profile_compiler(ctx: &GlobalContext<'_>, requested: Option<CompilerId>) -> Option<DetectedCompiler> {
    let detector = ctx.detector();
    let base: &ToolchainEnvironment = ctx.environment();
    let msvc = detector.msvc_installation(base);

    let candidate = match requested {
        Some(id) => detector.probe(id, base, msvc.as_ref()),
        None => detector.candidates(base, msvc.as_ref()).into_iter().next(),
    };
    let id = requested.or(candidate.as_ref().map(|c| c.id))?;
    Some(detector.prepare(id, candidate.as_ref(), base))
}

fn install_system_packages(
    ctx: &GlobalContext<'_>,
    options: &DepsOptions,
    prompt: &mut dyn Prompt,
) -> Result<()> {
    let shell = ctx.shell();
    shell.header("Checking System Dependencies");

    let Some(manager) = detect_manager(ctx.exec(), ctx.environment()) else {
        shell.warn("No supported package manager found");
        print_manual_list(shell, ctx.config());
        return Ok(());
    };
    shell.status(Status::Found, format!("package manager {}", manager));

    let system = SystemPackages::new(ctx.exec(), shell, ctx.environment(), manager, ctx.config());
    if let SystemOutcome::Failed(code) = system.run(options.interactive, prompt)? {
        tracing::warn!("{} exited with {:?}", manager.program(), code);
        shell.plain(format!("Install manually: {}", system.manual_command()));
    }
    Ok(())
}
