//! CMake generator selection.
//!
//! A generator is offered only when the active compiler is in its
//! compatibility set, it can run on the host, and its driver is installed.

use crate::core::{CompilerId, GeneratorChoice, GeneratorId, Platform, RigError, ToolchainEnvironment};
use crate::util::process::Executor;
use crate::util::prompt::{self, Prompt};
use crate::util::shell::{Shell, Status};

/// Which hosts a generator runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostConstraint {
    Any,
    WindowsOnly,
    NotWindows,
}

impl HostConstraint {
    pub fn allows(&self, host: Platform) -> bool {
        match self {
            HostConstraint::Any => true,
            HostConstraint::WindowsOnly => host.is_windows(),
            HostConstraint::NotWindows => !host.is_windows(),
        }
    }
}

/// How a generator's presence is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorProbe {
    /// The driver program must be on PATH
    Program(&'static str),
    /// A Visual Studio installation must exist
    VisualStudio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorCandidate {
    pub id: GeneratorId,
    pub display_name: &'static str,
    pub compatible: &'static [CompilerId],
    pub host: HostConstraint,
    pub probe: GeneratorProbe,
}

impl GeneratorCandidate {
    pub fn supports_compiler(&self, compiler: CompilerId) -> bool {
        self.compatible.contains(&compiler)
    }
}

/// Every known generator in priority order.
pub const GENERATORS: &[GeneratorCandidate] = &[
    GeneratorCandidate {
        id: GeneratorId::Ninja,
        display_name: "Ninja (fast)",
        compatible: &[CompilerId::Msvc, CompilerId::ClangCl, CompilerId::Clang, CompilerId::Gcc],
        host: HostConstraint::Any,
        probe: GeneratorProbe::Program("ninja"),
    },
    GeneratorCandidate {
        id: GeneratorId::UnixMakefiles,
        display_name: "Unix Makefiles",
        compatible: &[CompilerId::Clang, CompilerId::Gcc],
        host: HostConstraint::NotWindows,
        probe: GeneratorProbe::Program("make"),
    },
    GeneratorCandidate {
        id: GeneratorId::MinGwMakefiles,
        display_name: "MinGW Makefiles",
        compatible: &[CompilerId::Gcc],
        host: HostConstraint::WindowsOnly,
        probe: GeneratorProbe::Program("mingw32-make"),
    },
    GeneratorCandidate {
        id: GeneratorId::VisualStudio2022,
        display_name: "Visual Studio 2022",
        compatible: &[CompilerId::Msvc],
        host: HostConstraint::WindowsOnly,
        probe: GeneratorProbe::VisualStudio,
    },
];

/// Static description of a generator.
pub fn describe(id: GeneratorId) -> &'static GeneratorCandidate {
    match id {
        GeneratorId::Ninja => &GENERATORS[0],
        GeneratorId::UnixMakefiles => &GENERATORS[1],
        GeneratorId::MinGwMakefiles => &GENERATORS[2],
        GeneratorId::VisualStudio2022 => &GENERATORS[3],
    }
}

/// Reject a pinned generator that cannot work with the pinned compiler or
/// the host.
pub fn validate_generator(
    generator: GeneratorId,
    compiler: CompilerId,
    host: Platform,
) -> Result<(), RigError> {
    let candidate = describe(generator);
    if !candidate.host.allows(host) {
        return Err(RigError::InvalidConfiguration(format!(
            "generator '{}' is not available on {}",
            generator, host
        )));
    }
    if !candidate.supports_compiler(compiler) {
        return Err(RigError::InvalidConfiguration(format!(
            "generator '{}' cannot be used with compiler '{}'",
            generator, compiler
        )));
    }
    Ok(())
}

/// Resolves a generator for a compiler.
pub struct BuildSystemSelector<'a> {
    exec: &'a dyn Executor,
    shell: &'a Shell,
    host: Platform,
    visual_studio: bool,
}

impl<'a> BuildSystemSelector<'a> {
    /// `visual_studio` tells whether an MSVC installation was located.
    pub fn new(exec: &'a dyn Executor, shell: &'a Shell, host: Platform, visual_studio: bool) -> Self {
        BuildSystemSelector {
            exec,
            shell,
            host,
            visual_studio,
        }
    }

    /// Eligible generators for `compiler`, in priority order.
    pub fn candidates(
        &self,
        compiler: CompilerId,
        env: &ToolchainEnvironment,
    ) -> Vec<&'static GeneratorCandidate> {
        GENERATORS
            .iter()
            .filter(|g| g.supports_compiler(compiler) && g.host.allows(self.host))
            .filter(|g| match g.probe {
                GeneratorProbe::Program(name) => self.exec.find_program(name, env).is_some(),
                GeneratorProbe::VisualStudio => self.visual_studio,
            })
            .collect()
    }

    /// Pick a generator. No eligible generator falls back to CMake's
    /// default with a warning.
    pub fn select(
        &self,
        compiler: CompilerId,
        env: &ToolchainEnvironment,
        interactive: bool,
        prompt: &mut dyn Prompt,
    ) -> Result<GeneratorChoice, RigError> {
        self.shell.status(Status::Detecting, "build systems");
        let candidates = self.candidates(compiler, env);

        let chosen = match candidates.as_slice() {
            [] => {
                self.shell.warn("No build systems found, using CMake default");
                return Ok(GeneratorChoice::Default);
            }
            [only] => {
                self.shell
                    .status(Status::Selected, format!("build system {}", only.display_name));
                *only
            }
            _ if interactive => {
                let items: Vec<String> = candidates
                    .iter()
                    .map(|g| g.display_name.to_string())
                    .collect();
                let index = prompt::select(
                    prompt,
                    self.shell,
                    "Available build systems:",
                    "build system",
                    &items,
                    0,
                )?;
                candidates[index]
            }
            [first, ..] => *first,
        };

        Ok(GeneratorChoice::Explicit(chosen.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockExecutor, ScriptedPrompt};

    const ALL_COMPILERS: [CompilerId; 4] = [
        CompilerId::Msvc,
        CompilerId::ClangCl,
        CompilerId::Clang,
        CompilerId::Gcc,
    ];

    #[test]
    fn test_incompatible_generators_never_offered() {
        let exec = MockExecutor::new().with_programs(&["ninja", "make", "mingw32-make"]);
        let shell = Shell::quiet();
        let env = ToolchainEnvironment::default();

        for host in [Platform::Linux, Platform::Windows, Platform::Macos] {
            let selector = BuildSystemSelector::new(&exec, &shell, host, true);
            for compiler in ALL_COMPILERS {
                for candidate in selector.candidates(compiler, &env) {
                    assert!(candidate.supports_compiler(compiler));
                    assert!(candidate.host.allows(host));
                }
            }
        }
    }

    #[test]
    fn test_visual_studio_only_with_msvc() {
        let exec = MockExecutor::new().with_program("ninja");
        let shell = Shell::quiet();
        let selector = BuildSystemSelector::new(&exec, &shell, Platform::Windows, true);
        let env = ToolchainEnvironment::default();

        let ids = |c| -> Vec<GeneratorId> { selector.candidates(c, &env).iter().map(|g| g.id).collect() };
        assert_eq!(ids(CompilerId::Msvc), vec![GeneratorId::Ninja, GeneratorId::VisualStudio2022]);
        assert_eq!(ids(CompilerId::ClangCl), vec![GeneratorId::Ninja]);
        assert_eq!(ids(CompilerId::Gcc), vec![GeneratorId::Ninja]);
    }

    #[test]
    fn test_single_candidate_auto_selected() {
        let exec = MockExecutor::new();
        let shell = Shell::quiet();
        let selector = BuildSystemSelector::new(&exec, &shell, Platform::Windows, true);
        let mut prompt = ScriptedPrompt::silent();

        let choice = selector
            .select(CompilerId::Msvc, &ToolchainEnvironment::default(), true, &mut prompt)
            .unwrap();

        assert_eq!(choice, GeneratorChoice::Explicit(GeneratorId::VisualStudio2022));
        assert!(prompt.questions().is_empty());
    }

    #[test]
    fn test_no_candidates_falls_back_to_default() {
        let exec = MockExecutor::new();
        let shell = Shell::quiet();
        let selector = BuildSystemSelector::new(&exec, &shell, Platform::Linux, false);
        let mut prompt = ScriptedPrompt::silent();

        let choice = selector
            .select(CompilerId::Gcc, &ToolchainEnvironment::default(), true, &mut prompt)
            .unwrap();
        assert_eq!(choice, GeneratorChoice::Default);
    }

    #[test]
    fn test_menu_when_several() {
        let exec = MockExecutor::new().with_programs(&["ninja", "make"]);
        let shell = Shell::quiet();
        let selector = BuildSystemSelector::new(&exec, &shell, Platform::Linux, false);
        let env = ToolchainEnvironment::default();

        let mut prompt = ScriptedPrompt::new(["2"]);
        let choice = selector.select(CompilerId::Gcc, &env, true, &mut prompt).unwrap();
        assert_eq!(choice, GeneratorChoice::Explicit(GeneratorId::UnixMakefiles));
        assert_eq!(prompt.questions(), ["Select build system [1]: "]);

        let mut silent = ScriptedPrompt::silent();
        let choice = selector.select(CompilerId::Gcc, &env, false, &mut silent).unwrap();
        assert_eq!(choice, GeneratorChoice::Explicit(GeneratorId::Ninja));
        assert!(silent.questions().is_empty());
    }

    #[test]
    fn test_validate_generator() {
        assert!(validate_generator(GeneratorId::Ninja, CompilerId::Msvc, Platform::Windows).is_ok());
        assert!(matches!(
            validate_generator(GeneratorId::VisualStudio2022, CompilerId::Gcc, Platform::Windows),
            Err(RigError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            validate_generator(GeneratorId::UnixMakefiles, CompilerId::Gcc, Platform::Windows),
            Err(RigError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            validate_generator(GeneratorId::MinGwMakefiles, CompilerId::Gcc, Platform::Linux),
            Err(RigError::InvalidConfiguration(_))
        ));
    }
}
