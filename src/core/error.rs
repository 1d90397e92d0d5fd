//! Error kinds surfaced by resolution and invocation.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// `what` of a [`RigError::PathValidation`] for a build tree that was
/// never configured.
pub const BUILD_DIRECTORY: &str = "build directory";

/// Failures that abort a run.
///
/// Recoverable discovery problems (no generator, missing optional library,
/// failed environment extraction) never become a `RigError`; they are
/// reported as warnings and the run continues.
#[derive(Debug, Error)]
pub enum RigError {
    #[error("no {what} found")]
    ToolNotFound { what: String, hints: Vec<String> },

    #[error("{what} does not exist: {}", path.display())]
    PathValidation { what: String, path: PathBuf },

    #[error("cancelled by user")]
    UserCancelled,

    #[error("`{command}` failed with exit code {}", code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string()))]
    Subprocess { command: String, code: Option<i32> },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl RigError {
    pub fn tool_not_found(what: impl Into<String>) -> Self {
        RigError::ToolNotFound {
            what: what.into(),
            hints: Vec::new(),
        }
    }

    pub fn path_validation(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        RigError::PathValidation {
            what: what.into(),
            path: path.into(),
        }
    }

    /// Process exit code for this failure. A subprocess's own nonzero code is
    /// passed through; everything else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            RigError::Subprocess {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }

    /// Convert to a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            RigError::ToolNotFound { what, hints } => {
                let mut diag = Diagnostic::error(format!("no {} found", what));
                for hint in hints {
                    diag = diag.with_suggestion(hint.clone());
                }
                diag
            }
            RigError::PathValidation { what, path } => {
                let suggestion = if what == BUILD_DIRECTORY {
                    suggestions::NOT_CONFIGURED
                } else {
                    "Check the path passed on the command line"
                };
                Diagnostic::error(format!("{} does not exist", what))
                    .with_location(path.clone())
                    .with_suggestion(suggestion)
            }
            RigError::UserCancelled => Diagnostic::error("cancelled by user"),
            RigError::Subprocess { command, code } => {
                let mut diag = Diagnostic::error(self.to_string()).with_context(command.clone());
                if code.is_none() {
                    diag = diag.with_context("process was terminated by a signal");
                }
                diag.with_suggestion(suggestions::SUBPROCESS_FAILED)
            }
            RigError::InvalidConfiguration(msg) => {
                Diagnostic::error(format!("invalid configuration: {}", msg))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(RigError::UserCancelled.exit_code(), 1);
        assert_eq!(RigError::tool_not_found("C++ compiler").exit_code(), 1);

        let err = RigError::Subprocess {
            command: "cmake -S . -B build".to_string(),
            code: Some(3),
        };
        assert_eq!(err.exit_code(), 3);

        let killed = RigError::Subprocess {
            command: "cmake".to_string(),
            code: None,
        };
        assert_eq!(killed.exit_code(), 1);
    }

    #[test]
    fn test_tool_not_found_diagnostic_lists_hints() {
        let err = RigError::ToolNotFound {
            what: "C++ compiler".to_string(),
            hints: vec!["sudo apt install g++".to_string()],
        };
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("error: no C++ compiler found"));
        assert!(output.contains("1. sudo apt install g++"));
    }

    #[test]
    fn test_subprocess_message() {
        let err = RigError::Subprocess {
            command: "conan install .".to_string(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "`conan install .` failed with exit code 2");
    }

    #[test]
    fn test_unconfigured_build_dir_suggests_configure() {
        let err = RigError::path_validation(BUILD_DIRECTORY, "/work/app/build/release/linux");
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("build directory does not exist"));
        assert!(output.contains(suggestions::NOT_CONFIGURED));
    }
}
