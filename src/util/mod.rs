//! Utility modules.

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod fs;
pub mod process;
pub mod prompt;
pub mod shell;

pub use config::{load_project_config, RiggerConfig};
pub use context::GlobalContext;
pub use diagnostic::Diagnostic;
pub use process::{Executor, ProcessBuilder, ProcessOutput, SystemExecutor};
pub use prompt::{Prompt, TerminalPrompt};
pub use shell::Shell;
