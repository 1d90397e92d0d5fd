//! Presence and version checks for external tools.
//!
//! Absence is a normal outcome here. Nothing in this module returns an
//! error: a program that is not on PATH is simply unavailable, and a program
//! that cannot be spawned reports exit code 127.

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use semver::Version;

use crate::core::ToolchainEnvironment;
use crate::util::process::{Executor, ProcessBuilder, ProcessOutput};

/// Exit code reported when a probed program could not be started.
pub const NOT_FOUND_CODE: i32 = 127;

/// Probes tools on the PATH of one environment snapshot.
pub struct ToolProbe<'a> {
    exec: &'a dyn Executor,
    env: &'a ToolchainEnvironment,
}

impl<'a> ToolProbe<'a> {
    pub fn new(exec: &'a dyn Executor, env: &'a ToolchainEnvironment) -> Self {
        ToolProbe { exec, env }
    }

    /// Whether `tool` is on the search path. Never runs the tool.
    pub fn is_available(&self, tool: &str) -> bool {
        self.locate(tool).is_some()
    }

    /// Full path of `tool`, if it is on the search path.
    pub fn locate(&self, tool: &str) -> Option<PathBuf> {
        let found = self.exec.find_program(tool, self.env);
        tracing::debug!(
            "probe {}: {}",
            tool,
            found
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "not found".to_string())
        );
        found
    }

    /// Run `tool args...` and return its raw output. Callers parse it.
    pub fn query_version(&self, tool: &str, args: &[&str]) -> ProcessOutput {
        let cmd = ProcessBuilder::new(tool).args(args).environment(self.env);
        match self.exec.output(&cmd) {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!("failed to run {}: {:#}", tool, e);
                ProcessOutput {
                    code: Some(NOT_FOUND_CODE),
                    stdout: String::new(),
                    stderr: format!("command not found: {}", tool),
                }
            }
        }
    }

    /// First line of `tool --version`, when the tool runs successfully.
    pub fn version_line(&self, tool: &str) -> Option<String> {
        let output = self.query_version(tool, &["--version"]);
        if !output.success() {
            return None;
        }
        output.first_line().map(str::to_string)
    }

    /// Parsed version of a compiler driver (`g++ --version` and friends).
    pub fn compiler_version(&self, program: &str) -> Option<Version> {
        let output = self.query_version(program, &["--version"]);
        if !output.success() {
            return None;
        }
        parse_version(&output.stdout)
    }
}

/// Extract the first `major.minor[.patch]` number from tool output, or a
/// standalone major number when no dotted version is present.
pub fn parse_version(text: &str) -> Option<Version> {
    static VERSION_RE: OnceLock<Regex> = OnceLock::new();
    static MAJOR_RE: OnceLock<Regex> = OnceLock::new();
    let re = VERSION_RE.get_or_init(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").unwrap());
    let major = MAJOR_RE.get_or_init(|| Regex::new(r"\b(\d+)\b").unwrap());

    let caps = re.captures(text).or_else(|| major.captures(text))?;
    let part = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    Some(Version::new(part(1), part(2), part(3)))
}
