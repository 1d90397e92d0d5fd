//! Configuration resolution.
//!
//! Every field of a [`ConfigRequest`] is resolved from, lowest precedence
//! first:
//!
//! 1. the built-in default
//! 2. platform auto-detection
//! 3. an interactive prompt
//! 4. an explicit override (`[defaults]` in Rigger.toml, then the command line)
//!
//! Fields are resolved in dependency order: build type, compiler, build
//! system (which depends on the compiler), tests, dependency manager. The
//! result is immutable.

use semver::Version;

use crate::builder::generator::{describe, validate_generator, BuildSystemSelector};
use crate::core::{
    BuildType, CompilerId, ConfigRequest, GeneratorChoice, Platform, ResolvedConfig, RigError,
    ToolchainEnvironment,
};
use crate::toolchain::{CompilerOverrides, DetectedCompiler, ToolProbe};
use crate::util::config::DefaultsConfig;
use crate::util::context::GlobalContext;
use crate::util::process::Executor;
use crate::util::prompt::{self, Prompt};
use crate::util::shell::Status;

/// Outcome of a resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub config: ResolvedConfig,
    /// Compiler executables for CMake
    pub overrides: CompilerOverrides,
    /// Environment for every later subprocess of this run
    pub environment: ToolchainEnvironment,
}

impl Resolution {
    /// Version reported by the selected compiler driver. `None` for MSVC,
    /// which has no `--version`.
    pub fn compiler_version(&self, exec: &dyn Executor) -> Option<Version> {
        let cxx = self.overrides.cxx_compiler?;
        ToolProbe::new(exec, &self.environment).compiler_version(cxx)
    }
}

/// Turns a request into a [`ResolvedConfig`].
pub struct ConfigurationResolver<'c, 'a> {
    ctx: &'c GlobalContext<'a>,
}

impl<'c, 'a> ConfigurationResolver<'c, 'a> {
    pub fn new(ctx: &'c GlobalContext<'a>) -> Self {
        ConfigurationResolver { ctx }
    }

    /// Resolve every field. Contradictory explicit values are rejected
    /// before anything is probed.
    pub fn resolve(
        &self,
        request: ConfigRequest,
        prompt: &mut dyn Prompt,
    ) -> Result<Resolution, RigError> {
        let request = apply_defaults(request, &self.ctx.config().defaults);
        let host = self.ctx.host().platform;
        validate_request(&request, host)?;

        let build_type = self.resolve_build_type(&request, prompt)?;
        let (detected, visual_studio) = self.resolve_compiler(&request, prompt)?;
        let generator = self.resolve_generator(
            &request,
            detected.compiler,
            &detected.environment,
            visual_studio,
            prompt,
        )?;
        let build_tests = self.resolve_tests(&request, prompt)?;
        let use_dependency_manager =
            self.resolve_dependency_manager(&request, &detected.environment, prompt)?;

        let config = ResolvedConfig {
            project_root: self.ctx.project_root().to_path_buf(),
            build_root: self.ctx.config().cmake.build_root().to_string(),
            build_type,
            compiler: detected.compiler,
            generator,
            platform: request.platform.unwrap_or(host),
            build_tests,
            use_dependency_manager,
            clean: request.clean,
            interactive: request.interactive,
            extra_args: request.extra_args,
        };
        tracing::info!(
            "resolved {} / {} / {} for {}",
            config.build_type,
            config.compiler,
            config.generator,
            config.platform
        );

        Ok(Resolution {
            config,
            overrides: detected.overrides,
            environment: detected.environment,
        })
    }

    fn resolve_build_type(
        &self,
        request: &ConfigRequest,
        prompt: &mut dyn Prompt,
    ) -> Result<BuildType, RigError> {
        if let Some(build_type) = request.build_type {
            return Ok(build_type);
        }
        if !request.interactive {
            return Ok(BuildType::default());
        }

        let items: Vec<String> = BuildType::ALL.iter().map(|b| b.to_string()).collect();
        let default = BuildType::ALL
            .iter()
            .position(|b| *b == BuildType::default())
            .unwrap_or(0);
        let index = prompt::select(
            prompt,
            self.ctx.shell(),
            "Build types:",
            "build type",
            &items,
            default,
        )?;
        Ok(BuildType::ALL[index])
    }

    /// Returns the prepared compiler and whether Visual Studio was found.
    fn resolve_compiler(
        &self,
        request: &ConfigRequest,
        prompt: &mut dyn Prompt,
    ) -> Result<(DetectedCompiler, bool), RigError> {
        let shell = self.ctx.shell();
        let detector = self.ctx.detector();
        let base = self.ctx.environment();
        let msvc = detector.msvc_installation(base);

        let (id, candidate) = match request.compiler {
            Some(id) => {
                let candidate = detector.probe(id, base, msvc.as_ref());
                if candidate.is_none() {
                    shell.warn(format!(
                        "{} was not found; passing it to CMake as requested",
                        id.display_name()
                    ));
                }
                (id, candidate)
            }
            None => {
                let candidates = detector.candidates(base, msvc.as_ref());
                let chosen = detector.choose(candidates, request.interactive, prompt)?;
                (chosen.id, Some(chosen))
            }
        };

        shell.status(Status::Selected, format!("compiler {}", id.display_name()));
        let detected = detector.prepare(id, candidate.as_ref(), base);
        Ok((detected, msvc.is_some()))
    }

    fn resolve_generator(
        &self,
        request: &ConfigRequest,
        compiler: CompilerId,
        env: &ToolchainEnvironment,
        visual_studio: bool,
        prompt: &mut dyn Prompt,
    ) -> Result<GeneratorChoice, RigError> {
        let host = self.ctx.host().platform;

        if let Some(generator) = request.generator {
            validate_generator(generator, compiler, host)?;
            self.ctx.shell().status(
                Status::Selected,
                format!("build system {}", describe(generator).display_name),
            );
            return Ok(GeneratorChoice::Explicit(generator));
        }

        BuildSystemSelector::new(self.ctx.exec(), self.ctx.shell(), host, visual_studio).select(
            compiler,
            env,
            request.interactive,
            prompt,
        )
    }

    fn resolve_tests(
        &self,
        request: &ConfigRequest,
        prompt: &mut dyn Prompt,
    ) -> Result<bool, RigError> {
        match request.build_tests {
            Some(value) => Ok(value),
            None if request.interactive => {
                prompt::confirm(prompt, self.ctx.shell(), "Build tests?", false)
            }
            None => Ok(false),
        }
    }

    /// Conan is only offered when it is installed.
    fn resolve_dependency_manager(
        &self,
        request: &ConfigRequest,
        env: &ToolchainEnvironment,
        prompt: &mut dyn Prompt,
    ) -> Result<bool, RigError> {
        if let Some(value) = request.use_dependency_manager {
            return Ok(value);
        }
        if !request.interactive {
            return Ok(false);
        }

        let shell = self.ctx.shell();
        if self.ctx.exec().find_program("conan", env).is_none() {
            shell.note("Conan not found. Will use system packages or CPM.");
            return Ok(false);
        }
        prompt::confirm(prompt, shell, "Use Conan for dependencies?", false)
    }
}

/// Fill unset request fields from `[defaults]`. The command line wins.
pub fn apply_defaults(mut request: ConfigRequest, defaults: &DefaultsConfig) -> ConfigRequest {
    request.build_type = request.build_type.or(defaults.build_type);
    request.compiler = request.compiler.or(defaults.compiler);
    request.generator = request.generator.or(defaults.generator);
    request.build_tests = request.build_tests.or(defaults.tests);
    request.use_dependency_manager = request.use_dependency_manager.or(defaults.use_conan);
    request
}

/// Reject explicit values that cannot work on this host or together.
pub fn validate_request(request: &ConfigRequest, host: Platform) -> Result<(), RigError> {
    if let Some(compiler) = request.compiler {
        if !compiler.supports_host(host) {
            return Err(RigError::InvalidConfiguration(format!(
                "compiler '{}' is not available on {}",
                compiler, host
            )));
        }
    }

    if let Some(generator) = request.generator {
        if !describe(generator).host.allows(host) {
            return Err(RigError::InvalidConfiguration(format!(
                "generator '{}' is not available on {}",
                generator, host
            )));
        }
        if let Some(compiler) = request.compiler {
            validate_generator(generator, compiler, host)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuildInvoker, CMakeSettings};
    use crate::core::GeneratorId;
    use crate::test_support::{
        cmake_project, isolated_context, touch, vcvars_dump, MockExecutor, MockProcessOutput,
        ScriptedPrompt,
    };
    use crate::toolchain::{Host, MsvcInstallation};
    use crate::util::config::RiggerConfig;
    use crate::util::shell::Shell;
    use tempfile::TempDir;

    fn linux() -> Host {
        Host::new(Platform::Linux, "x86_64")
    }

    fn windows() -> Host {
        Host::new(Platform::Windows, "x86_64")
    }

    fn configure_args(ctx: &GlobalContext<'_>, resolution: &Resolution) -> Vec<String> {
        let settings = CMakeSettings::new(&ctx.config().cmake, ctx.host());
        BuildInvoker::new(ctx.exec(), ctx.shell(), settings)
            .configure_command(&resolution.config, &resolution.overrides)
            .get_args()
            .to_vec()
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    /// A Visual Studio installation reported by vswhere.
    fn visual_studio(tmp: &TempDir, exec: &MockExecutor) -> MsvcInstallation {
        let vs = MsvcInstallation::new(tmp.path().join("VS"));
        touch(&vs.vcvarsall());
        exec.expect_prefix(
            "/mock/bin/vswhere",
            MockProcessOutput::success(format!("{}\n", vs.path.display())),
        );
        exec.expect_prefix("cmd /c", MockProcessOutput::success(vcvars_dump()));
        vs
    }

    #[test]
    fn test_explicit_gcc_non_interactive_picks_ninja() {
        let project = cmake_project();
        let exec = MockExecutor::new().with_programs(&["g++", "ninja"]);
        let shell = Shell::quiet();
        let ctx = isolated_context(&exec, &shell, project.path(), linux());

        let mut request = ConfigRequest::new(project.path()).non_interactive();
        request.compiler = Some(CompilerId::Gcc);
        let mut prompt = ScriptedPrompt::silent();

        let resolution = ConfigurationResolver::new(&ctx)
            .resolve(request, &mut prompt)
            .unwrap();

        assert_eq!(resolution.config.compiler, CompilerId::Gcc);
        assert_eq!(
            resolution.config.generator,
            GeneratorChoice::Explicit(GeneratorId::Ninja)
        );
        assert!(prompt.questions().is_empty());

        let args = configure_args(&ctx, &resolution);
        assert!(has_pair(&args, "-G", "Ninja"));
        assert!(args.contains(&"-DCMAKE_CXX_COMPILER=g++".to_string()));
    }

    #[test]
    fn test_windows_msvc_single_generator_auto_selected() {
        let project = cmake_project();
        let tmp = TempDir::new().unwrap();
        let exec = MockExecutor::new().with_program("vswhere");
        visual_studio(&tmp, &exec);
        let shell = Shell::quiet();
        let ctx = isolated_context(&exec, &shell, project.path(), windows());

        let mut request = ConfigRequest::new(project.path());
        request.build_type = Some(BuildType::Release);
        request.compiler = Some(CompilerId::Msvc);
        request.build_tests = Some(false);
        request.use_dependency_manager = Some(false);
        let mut prompt = ScriptedPrompt::silent();

        let resolution = ConfigurationResolver::new(&ctx)
            .resolve(request, &mut prompt)
            .unwrap();

        assert_eq!(
            resolution.config.generator,
            GeneratorChoice::Explicit(GeneratorId::VisualStudio2022)
        );
        assert!(prompt.questions().is_empty());
        assert!(resolution.environment.contains("INCLUDE"));
        assert!(resolution.overrides.is_empty());

        let args = configure_args(&ctx, &resolution);
        assert!(has_pair(&args, "-A", "x64"));
    }

    #[test]
    fn test_msvc_with_ninja_has_no_platform_flag() {
        let project = cmake_project();
        let tmp = TempDir::new().unwrap();
        let exec = MockExecutor::new().with_program("vswhere");
        visual_studio(&tmp, &exec);
        let shell = Shell::quiet();
        let ctx = isolated_context(&exec, &shell, project.path(), windows());

        let mut request = ConfigRequest::new(project.path()).non_interactive();
        request.compiler = Some(CompilerId::Msvc);
        request.generator = Some(GeneratorId::Ninja);

        let resolution = ConfigurationResolver::new(&ctx)
            .resolve(request, &mut ScriptedPrompt::silent())
            .unwrap();

        let args = configure_args(&ctx, &resolution);
        assert!(has_pair(&args, "-G", "Ninja"));
        assert!(!args.contains(&"-A".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("-DCMAKE_CXX_COMPILER")));
    }

    #[test]
    fn test_no_compilers_fails_before_cmake() {
        let project = cmake_project();
        let exec = MockExecutor::new().with_program("ninja");
        let shell = Shell::quiet();
        let ctx = isolated_context(&exec, &shell, project.path(), linux());

        let request = ConfigRequest::new(project.path()).non_interactive();
        let err = ConfigurationResolver::new(&ctx)
            .resolve(request, &mut ScriptedPrompt::silent())
            .unwrap_err();

        assert!(matches!(err, RigError::ToolNotFound { .. }));
        assert_eq!(err.exit_code(), 1);
        assert!(exec.calls_starting_with("cmake").is_empty());
    }

    #[test]
    fn test_explicit_overrides_never_prompt() {
        let project = cmake_project();
        let exec = MockExecutor::new().with_programs(&["g++", "clang++", "ninja", "make", "conan"]);
        let shell = Shell::quiet();
        let ctx = isolated_context(&exec, &shell, project.path(), linux());

        let mut request = ConfigRequest::new(project.path());
        request.build_type = Some(BuildType::Debug);
        request.compiler = Some(CompilerId::Gcc);
        request.generator = Some(GeneratorId::UnixMakefiles);
        request.build_tests = Some(true);
        request.use_dependency_manager = Some(false);
        let mut prompt = ScriptedPrompt::silent();

        let resolution = ConfigurationResolver::new(&ctx)
            .resolve(request, &mut prompt)
            .unwrap();

        assert!(prompt.questions().is_empty());
        assert_eq!(resolution.config.build_type, BuildType::Debug);
        assert_eq!(
            resolution.config.generator,
            GeneratorChoice::Explicit(GeneratorId::UnixMakefiles)
        );
        assert!(resolution.config.build_tests);
    }

    #[test]
    fn test_interactive_prompts_in_order() {
        let project = cmake_project();
        let exec = MockExecutor::new().with_programs(&["g++", "clang++", "ninja", "make", "conan"]);
        let shell = Shell::quiet();
        let ctx = isolated_context(&exec, &shell, project.path(), linux());

        let mut prompt = ScriptedPrompt::new(["", "2", "", "y", ""]);
        let resolution = ConfigurationResolver::new(&ctx)
            .resolve(ConfigRequest::new(project.path()), &mut prompt)
            .unwrap();

        assert_eq!(
            prompt.questions(),
            [
                "Select build type [3]: ",
                "Select compiler [1]: ",
                "Select build system [1]: ",
                "Build tests? [y/N] ",
                "Use Conan for dependencies? [y/N] ",
            ]
        );
        let config = &resolution.config;
        assert_eq!(config.build_type, BuildType::Release);
        assert_eq!(config.compiler, CompilerId::Gcc);
        assert_eq!(config.generator, GeneratorChoice::Explicit(GeneratorId::Ninja));
        assert!(config.build_tests);
        assert!(!config.use_dependency_manager);
    }

    #[test]
    fn test_conan_not_offered_when_missing() {
        let project = cmake_project();
        let exec = MockExecutor::new().with_programs(&["g++", "ninja"]);
        let shell = Shell::quiet();
        let ctx = isolated_context(&exec, &shell, project.path(), linux());

        let mut request = ConfigRequest::new(project.path());
        request.build_type = Some(BuildType::Release);
        request.build_tests = Some(false);
        let mut prompt = ScriptedPrompt::silent();

        let resolution = ConfigurationResolver::new(&ctx)
            .resolve(request, &mut prompt)
            .unwrap();
        assert!(!resolution.config.use_dependency_manager);
        assert!(prompt.questions().is_empty());
    }

    #[test]
    fn test_build_type_prompt_cancelled() {
        let project = cmake_project();
        let exec = MockExecutor::new().with_program("g++");
        let shell = Shell::quiet();
        let ctx = isolated_context(&exec, &shell, project.path(), linux());

        let err = ConfigurationResolver::new(&ctx)
            .resolve(ConfigRequest::new(project.path()), &mut ScriptedPrompt::silent())
            .unwrap_err();
        assert!(matches!(err, RigError::UserCancelled));
    }

    #[test]
    fn test_project_defaults_count_as_explicit() {
        let project = cmake_project();
        let exec = MockExecutor::new().with_programs(&["g++", "ninja"]);
        let shell = Shell::quiet();
        let mut config = RiggerConfig::default();
        config.defaults.build_type = Some(BuildType::Debug);
        config.defaults.tests = Some(true);
        config.defaults.use_conan = Some(false);
        let ctx = isolated_context(&exec, &shell, project.path(), linux()).with_config(config);
        let mut prompt = ScriptedPrompt::silent();

        let resolution = ConfigurationResolver::new(&ctx)
            .resolve(ConfigRequest::new(project.path()), &mut prompt)
            .unwrap();
        assert_eq!(resolution.config.build_type, BuildType::Debug);
        assert!(resolution.config.build_tests);
        assert!(prompt.questions().is_empty());

        // the command line wins over Rigger.toml
        let mut request = ConfigRequest::new(project.path());
        request.build_type = Some(BuildType::RelWithDebInfo);
        let resolution = ConfigurationResolver::new(&ctx)
            .resolve(request, &mut prompt)
            .unwrap();
        assert_eq!(resolution.config.build_type, BuildType::RelWithDebInfo);
    }

    #[test]
    fn test_contradictory_flags_rejected() {
        let mut request = ConfigRequest::new("/proj");
        request.compiler = Some(CompilerId::Msvc);
        assert!(matches!(
            validate_request(&request, Platform::Linux),
            Err(RigError::InvalidConfiguration(_))
        ));

        let mut request = ConfigRequest::new("/proj");
        request.compiler = Some(CompilerId::Gcc);
        request.generator = Some(GeneratorId::VisualStudio2022);
        assert!(matches!(
            validate_request(&request, Platform::Windows),
            Err(RigError::InvalidConfiguration(_))
        ));

        let mut request = ConfigRequest::new("/proj");
        request.generator = Some(GeneratorId::UnixMakefiles);
        assert!(matches!(
            validate_request(&request, Platform::Windows),
            Err(RigError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_explicit_clang_accepted_on_windows() {
        let project = cmake_project();
        let exec = MockExecutor::new().with_programs(&["clang++", "ninja"]);
        let shell = Shell::quiet();
        let ctx = isolated_context(&exec, &shell, project.path(), windows());

        let mut request = ConfigRequest::new(project.path()).non_interactive();
        request.compiler = Some(CompilerId::Clang);
        assert!(validate_request(&request, Platform::Windows).is_ok());

        let resolution = ConfigurationResolver::new(&ctx)
            .resolve(request, &mut ScriptedPrompt::silent())
            .unwrap();
        assert_eq!(resolution.config.compiler, CompilerId::Clang);

        let args = configure_args(&ctx, &resolution);
        assert!(has_pair(&args, "-G", "Ninja"));
        assert!(args.contains(&"-DCMAKE_CXX_COMPILER=clang++".to_string()));
    }

    #[test]
    fn test_explicit_generator_incompatible_with_detected_compiler() {
        let project = cmake_project();
        let exec = MockExecutor::new().with_program("g++");
        let shell = Shell::quiet();
        let ctx = isolated_context(&exec, &shell, project.path(), windows());

        let mut request = ConfigRequest::new(project.path()).non_interactive();
        request.generator = Some(GeneratorId::VisualStudio2022);

        let err = ConfigurationResolver::new(&ctx)
            .resolve(request, &mut ScriptedPrompt::silent())
            .unwrap_err();
        assert!(matches!(err, RigError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_platform_override_keys_build_dir() {
        let project = cmake_project();
        let exec = MockExecutor::new().with_programs(&["g++", "ninja"]);
        let shell = Shell::quiet();
        let ctx = isolated_context(&exec, &shell, project.path(), linux());

        let mut request = ConfigRequest::new(project.path()).non_interactive();
        request.platform = Some(Platform::Windows);
        request.build_type = Some(BuildType::Debug);

        let resolution = ConfigurationResolver::new(&ctx)
            .resolve(request, &mut ScriptedPrompt::silent())
            .unwrap();
        assert!(resolution.config.build_dir().ends_with("build/debug/windows"));
    }

    #[test]
    fn test_compiler_version_from_driver() {
        let project = cmake_project();
        let exec = MockExecutor::new().with_programs(&["g++", "ninja"]);
        exec.expect("g++ --version", MockProcessOutput::success("g++ (GCC) 15.1.1 20250425\n"));
        let shell = Shell::quiet();
        let ctx = isolated_context(&exec, &shell, project.path(), linux());

        let resolution = ConfigurationResolver::new(&ctx)
            .resolve(
                ConfigRequest::new(project.path()).non_interactive(),
                &mut ScriptedPrompt::silent(),
            )
            .unwrap();
        assert_eq!(resolution.compiler_version(&exec), Some(Version::new(15, 1, 1)));
    }
}
