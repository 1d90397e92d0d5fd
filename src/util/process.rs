//! Subprocess execution.
//!
//! Every external tool goes through an [`Executor`] so the resolution
//! pipeline can run against a scripted host in tests.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use crate::core::ToolchainEnvironment;

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    environment: Option<ToolchainEnvironment>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            environment: None,
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Run with exactly this environment instead of inheriting the parent's.
    pub fn environment(mut self, env: &ToolchainEnvironment) -> Self {
        self.environment = Some(env.clone());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the environment the process will run with, if replaced.
    pub fn get_environment(&self) -> Option<&ToolchainEnvironment> {
        self.environment.as_ref()
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref env) = self.environment {
            cmd.env_clear();
            for (key, value) in env.iter() {
                cmd.env(key, value);
            }
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command, capturing stdout and stderr.
    pub fn exec(&self) -> Result<ProcessOutput> {
        let output = self
            .build_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Execute with inherited stdio and return the exit code
    /// (`None` when terminated by a signal).
    pub fn status(&self) -> Result<Option<i32>> {
        let status = self
            .build_command()
            .status()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))?;
        Ok(status.code())
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|a| {
            if a.contains(' ') {
                format!("\"{}\"", a)
            } else {
                a.clone()
            }
        }));
        parts.join(" ")
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// First non-empty line of stdout, trimmed.
    pub fn first_line(&self) -> Option<&str> {
        self.stdout.lines().map(str::trim).find(|l| !l.is_empty())
    }
}

/// Host process services.
pub trait Executor {
    /// Locate a program on the PATH of `env`.
    fn find_program(&self, name: &str, env: &ToolchainEnvironment) -> Option<PathBuf>;

    /// Run to completion, capturing output.
    fn output(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput>;

    /// Run to completion with inherited stdio; returns the exit code.
    fn status(&self, cmd: &ProcessBuilder) -> Result<Option<i32>>;
}

/// Executor backed by the real operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn find_program(&self, name: &str, env: &ToolchainEnvironment) -> Option<PathBuf> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        which::which_in(name, env.path(), cwd).ok()
    }

    fn output(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        tracing::debug!("exec: {}", cmd.display_command());
        cmd.exec()
    }

    fn status(&self, cmd: &ProcessBuilder) -> Result<Option<i32>> {
        tracing::debug!("run: {}", cmd.display_command());
        cmd.status()
    }
}

/// Number of CPUs, used as the default parallel job count.
pub fn cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_process_builder_captures_stdout() {
        let output = ProcessBuilder::new("echo").arg("hello").exec().unwrap();

        assert!(output.success());
        assert_eq!(output.first_line(), Some("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_environment_is_replaced() {
        let env = ToolchainEnvironment::from_vars([("RIGGER_ONLY", "1")])
            .with_var("PATH", std::env::var("PATH").unwrap_or_default());
        let output = ProcessBuilder::new("sh")
            .args(["-c", "echo ${RIGGER_ONLY:-unset} ${HOME:-nohome}"])
            .environment(&env)
            .exec()
            .unwrap();

        assert_eq!(output.first_line(), Some("1 nohome"));
    }

    #[test]
    fn test_display_command_quotes_spaces() {
        let pb = ProcessBuilder::new("cmake").args(["-G", "Unix Makefiles", "-S", "."]);

        assert_eq!(pb.display_command(), "cmake -G \"Unix Makefiles\" -S .");
    }

    #[test]
    fn test_spawn_failure_is_an_error() {
        let result = SystemExecutor.output(&ProcessBuilder::new("rigger-no-such-program-xyz"));
        assert!(result.is_err());
    }
}
