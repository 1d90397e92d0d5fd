//! Test utilities and mocks for rigger unit tests.
//!
//! This module provides a scripted [`Executor`] and a scripted [`Prompt`] so
//! the resolution pipeline can run without real compilers or a terminal.
//!
//! # Example
//!
//! ```rust,ignore
//! use rigger::test_support::{MockExecutor, MockProcessOutput, ScriptedPrompt};
//!
//! #[test]
//! fn test_example() {
//!     let exec = MockExecutor::new().with_program("g++");
//!     exec.expect_prefix("cmake", MockProcessOutput::success(""));
//!
//!     let mut prompt = ScriptedPrompt::new(["1"]);
//!     // Run the resolver against exec and prompt...
//! }
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::core::ToolchainEnvironment;
use crate::util::process::{Executor, ProcessBuilder, ProcessOutput};
use crate::util::prompt::{Cancelled, Prompt};

pub use fixtures::*;

/// Mock process output.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    fn to_output(&self) -> ProcessOutput {
        ProcessOutput {
            code: Some(self.status),
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        }
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

#[derive(Debug, Clone)]
struct CommandExpectation {
    pattern: CommandPattern,
    output: MockProcessOutput,
}

/// A command the mock was asked to run.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub command: String,
    pub environment: Option<ToolchainEnvironment>,
}

/// Mock process executor.
///
/// Programs registered with [`MockExecutor::with_program`] are "on PATH".
/// Any other name is looked up in the directories of the supplied
/// environment's PATH, so tests can drop fake executables into a temp dir.
#[derive(Debug, Default)]
pub struct MockExecutor {
    programs: HashMap<String, PathBuf>,
    expectations: RefCell<Vec<CommandExpectation>>,
    calls: RefCell<Vec<RecordedCall>>,
    default_output: Option<MockProcessOutput>,
}

impl MockExecutor {
    /// Create a new mock executor with nothing on PATH.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Put a program on the mock PATH.
    pub fn with_program(mut self, name: &str) -> Self {
        self.programs
            .insert(name.to_string(), PathBuf::from("/mock/bin").join(name));
        self
    }

    /// Put several programs on the mock PATH.
    pub fn with_programs(mut self, names: &[&str]) -> Self {
        for name in names {
            self = self.with_program(name);
        }
        self
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn with_default(mut self, output: MockProcessOutput) -> Self {
        self.default_output = Some(output);
        self
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&self, cmd: &str, output: MockProcessOutput) -> &Self {
        self.push(CommandPattern::Exact(cmd.to_string()), output)
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&self, prefix: &str, output: MockProcessOutput) -> &Self {
        self.push(CommandPattern::StartsWith(prefix.to_string()), output)
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&self, substring: &str, output: MockProcessOutput) -> &Self {
        self.push(CommandPattern::Contains(substring.to_string()), output)
    }

    fn push(&self, pattern: CommandPattern, output: MockProcessOutput) -> &Self {
        self.expectations
            .borrow_mut()
            .push(CommandExpectation { pattern, output });
        self
    }

    /// Get all commands that were run.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.command.clone()).collect()
    }

    /// Get every recorded call including its environment.
    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// Commands starting with `prefix`.
    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn respond(&self, cmd: &ProcessBuilder) -> Result<MockProcessOutput> {
        let full_cmd = cmd.display_command();
        self.calls.borrow_mut().push(RecordedCall {
            command: full_cmd.clone(),
            environment: cmd.get_environment().cloned(),
        });

        // first registered match wins
        if let Some(exp) = self
            .expectations
            .borrow()
            .iter()
            .find(|exp| exp.pattern.matches(&full_cmd))
        {
            return Ok(exp.output.clone());
        }

        if let Some(ref default) = self.default_output {
            return Ok(default.clone());
        }

        bail!("unexpected command: {}", full_cmd)
    }
}

impl Executor for MockExecutor {
    fn find_program(&self, name: &str, env: &ToolchainEnvironment) -> Option<PathBuf> {
        if let Some(path) = self.programs.get(name) {
            return Some(path.clone());
        }

        let path = env.path()?;
        std::env::split_paths(path).find_map(|dir| {
            [name.to_string(), format!("{}.exe", name)]
                .into_iter()
                .map(|file| dir.join(file))
                .find(|candidate| candidate.is_file())
        })
    }

    fn output(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        Ok(self.respond(cmd)?.to_output())
    }

    fn status(&self, cmd: &ProcessBuilder) -> Result<Option<i32>> {
        Ok(Some(self.respond(cmd)?.status))
    }
}

/// Prompt that replays queued answers and records every question.
///
/// An empty queued answer means "pressed Enter" and yields the default.
/// When the queue runs dry the prompt reports [`Cancelled`], like
/// end-of-input on a terminal.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    questions: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompt {
            answers: answers.into_iter().map(Into::into).collect(),
            questions: Vec::new(),
        }
    }

    /// A prompt that must never be asked anything.
    pub fn silent() -> Self {
        ScriptedPrompt::default()
    }

    /// Every question asked so far.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, question: &str, default: &str) -> Result<String, Cancelled> {
        self.questions.push(question.to_string());
        match self.answers.pop_front() {
            Some(answer) if answer.is_empty() => Ok(default.to_string()),
            Some(answer) => Ok(answer),
            None => Err(Cancelled),
        }
    }
}
