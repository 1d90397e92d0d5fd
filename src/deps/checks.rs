//! Prerequisite checks run before dependencies are installed.
//!
//! ## Checks Performed
//!
//! - CMake (required)
//! - Git (required)
//! - At least one C++ compiler: g++, clang++, clang-cl, cl (required)
//! - Optional libraries from `[[optional]]` in Rigger.toml (warn only)

use std::path::PathBuf;

use crate::core::{Platform, RigError};
use crate::toolchain::detect::install_hints;
use crate::toolchain::ToolProbe;
use crate::util::config::OptionalLibrary;
use crate::util::shell::{Shell, Status};

/// Compiler drivers accepted by the compiler check, with labels.
const COMPILERS: &[(&str, &str)] = &[
    ("g++", "g++"),
    ("clang++", "clang++"),
    ("clang-cl", "Clang-CL (clang-cl)"),
    ("cl", "MSVC (cl.exe)"),
];

/// Result of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,

    /// Whether the check passed
    pub passed: bool,

    /// Human-readable status message
    pub message: String,

    /// Path to the tool (if applicable)
    pub path: Option<PathBuf>,

    /// Version string (if applicable)
    pub version: Option<String>,

    /// Whether a failure blocks the run
    pub required: bool,

    /// Install suggestions shown on failure
    pub hints: Vec<String>,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: true,
            message: message.into(),
            path: None,
            version: None,
            required: true,
            hints: Vec::new(),
        }
    }

    /// Create a failing check result.
    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            passed: false,
            ..CheckResult::pass(name, message)
        }
    }

    /// Mark this check as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set the tool path.
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_hints(mut self, hints: Vec<String>) -> Self {
        self.hints = hints;
        self
    }
}

/// All check results of one run.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub checks: Vec<CheckResult>,
}

impl CheckReport {
    /// Whether every required check passed.
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed || !c.required)
    }

    /// Required checks that failed.
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed && c.required)
    }

    /// Print every result.
    pub fn print(&self, shell: &Shell) {
        for check in &self.checks {
            let line = match &check.version {
                Some(version) => format!("{}: {}", check.name, version),
                None => format!("{}: {}", check.name, check.message),
            };

            if check.passed {
                shell.status(Status::Found, line);
            } else if check.required {
                shell.error(&check.message);
                if !check.hints.is_empty() {
                    shell.plain("Please install one of the following:");
                    for hint in &check.hints {
                        shell.plain(format!("  - {}", hint));
                    }
                }
            } else {
                shell.status(Status::Skipped, &check.message);
            }
        }
    }

    /// Convert the first required failure into an error.
    pub fn into_result(self) -> Result<(), RigError> {
        match self.checks.into_iter().find(|c| !c.passed && c.required) {
            Some(check) => Err(RigError::ToolNotFound {
                what: check.name,
                hints: check.hints,
            }),
            None => Ok(()),
        }
    }
}

/// A required tool that reports its version with `--version`.
pub fn check_tool(probe: &ToolProbe<'_>, name: &str, tool: &str, hint: &str) -> CheckResult {
    let Some(path) = probe.locate(tool) else {
        return CheckResult::fail(name, format!("{} not found", name))
            .with_hints(vec![hint.to_string()]);
    };

    let result = CheckResult::pass(name, "found").with_path(path);
    match probe.version_line(tool) {
        Some(version) => result.with_version(version),
        None => result,
    }
}

/// At least one C++ compiler must be on PATH.
pub fn check_compilers(probe: &ToolProbe<'_>, host: Platform) -> CheckResult {
    let found: Vec<String> = COMPILERS
        .iter()
        .filter(|(tool, _)| probe.is_available(tool))
        .map(|(tool, label)| match probe.version_line(tool) {
            Some(version) if *tool != "cl" && *tool != "clang-cl" => {
                format!("{}: {}", tool, version)
            }
            _ => label.to_string(),
        })
        .collect();

    if found.is_empty() {
        return CheckResult::fail("C++ compiler", "No C++ compiler found")
            .with_hints(install_hints(host));
    }

    CheckResult::pass("C++ compiler", found.join(", "))
}

/// An optional library, detected via pkg-config modules or marker tools.
pub fn check_optional(probe: &ToolProbe<'_>, library: &OptionalLibrary) -> CheckResult {
    if probe.is_available("pkg-config") {
        for module in &library.pkg_config {
            let output = probe.query_version("pkg-config", &["--modversion", module.as_str()]);
            if output.success() {
                let version = output.first_line().unwrap_or("found").to_string();
                return CheckResult::pass(&library.name, module.clone())
                    .with_version(format!("{} ({})", version, module))
                    .optional();
            }
        }
    }

    for tool in &library.tools {
        if let Some(path) = probe.locate(tool) {
            let result = CheckResult::pass(&library.name, tool.clone())
                .with_path(path)
                .optional();
            return match probe.version_line(tool) {
                Some(version) => result.with_version(version),
                None => result,
            };
        }
    }

    CheckResult::fail(
        &library.name,
        format!("{} not found. CMake may still find it.", library.name),
    )
    .optional()
}

/// Run every prerequisite check.
pub fn run_checks(probe: &ToolProbe<'_>, host: Platform, optional: &[OptionalLibrary]) -> CheckReport {
    let mut checks = vec![
        check_tool(probe, "CMake", "cmake", "Install CMake 3.25 or newer from https://cmake.org/download/"),
        check_tool(probe, "Git", "git", "Install Git from https://git-scm.com/downloads"),
        check_compilers(probe, host),
    ];
    checks.extend(optional.iter().map(|lib| check_optional(probe, lib)));
    CheckReport { checks }
}
