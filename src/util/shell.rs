//! Centralized shell output.
//!
//! The Shell is created once at startup. Color support is decided there,
//! from `--color` and whether stderr is a terminal, and never changes for
//! the rest of the run. Every operation receives the shell by reference.
//!
//! # Design Principles
//!
//! 1. **Commands never manage spacing/indentation directly** - Shell handles all formatting
//! 2. **Status verbs are right-aligned** to a 12-column gutter, like cargo

use std::fmt::Display;
use std::io::{self, IsTerminal};

use crate::util::diagnostic::{Diagnostic, Severity};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only
    Quiet,
    /// Default: status messages
    #[default]
    Normal,
    /// --verbose: status messages plus debug detail
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status types for output messages.
///
/// Shell handles all formatting - callers just specify the semantic status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Found,
    Selected,
    Finished,
    Removed,

    // In-progress statuses (cyan)
    Detecting,
    Configuring,
    Installing,
    Running,
    Building,

    // Info statuses (blue/default)
    Info,

    // Warning statuses (yellow)
    Skipped,
    Warning,

    // Error status (red)
    Error,
}

impl Status {
    /// Get the display text for this status.
    fn as_str(&self) -> &'static str {
        match self {
            Status::Found => "Found",
            Status::Selected => "Selected",
            Status::Finished => "Finished",
            Status::Removed => "Removed",
            Status::Detecting => "Detecting",
            Status::Configuring => "Configuring",
            Status::Installing => "Installing",
            Status::Running => "Running",
            Status::Building => "Building",
            Status::Info => "Info",
            Status::Skipped => "Skipped",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    /// Get the ANSI color code for this status.
    fn color_code(&self) -> &'static str {
        match self {
            Status::Found | Status::Selected | Status::Finished | Status::Removed => "\x1b[1;32m",
            Status::Detecting
            | Status::Configuring
            | Status::Installing
            | Status::Running
            | Status::Building => "\x1b[1;36m",
            Status::Info => "\x1b[1;34m",
            Status::Skipped | Status::Warning => "\x1b[1;33m",
            Status::Error => "\x1b[1;31m",
        }
    }
}

const STATUS_WIDTH: usize = 12;

/// Central shell for all CLI output.
#[derive(Debug, Clone)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
}

impl Shell {
    /// Create a new shell. `ColorChoice::Auto` is resolved here, once.
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };

        Shell {
            verbosity,
            use_color,
        }
    }

    /// Create a shell from CLI flags. Quiet wins over verbose.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Shell::new(verbosity, color)
    }

    /// A shell that prints nothing but errors and never colors. Used by tests.
    pub fn quiet() -> Self {
        Shell::new(Verbosity::Quiet, ColorChoice::Never)
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a status message.
    ///
    /// Format: `{status:>12} {message}`
    ///
    /// In quiet mode, only Error status is printed.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_quiet() && status != Status::Error {
            return;
        }

        eprintln!("{} {}", self.format_status(status), msg);
    }

    /// Print an info message.
    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: impl Display) {
        self.status(Status::Error, msg);
    }

    /// Print a line without a status gutter, indented to line up with
    /// status messages.
    pub fn plain(&self, msg: impl Display) {
        if self.is_quiet() {
            return;
        }
        eprintln!("{:width$} {}", "", msg, width = STATUS_WIDTH);
    }

    /// Print a multi-line diagnostic. Only errors survive quiet mode.
    pub fn diagnostic(&self, diagnostic: &Diagnostic) {
        if self.is_quiet() && diagnostic.severity != Severity::Error {
            return;
        }
        eprint!("{}", diagnostic.format(self.use_color));
    }

    /// Print a section banner.
    pub fn header(&self, title: impl Display) {
        if self.is_quiet() {
            return;
        }
        let rule = "=".repeat(60);
        if self.use_color {
            eprintln!("\x1b[1m{}\n{}\n{}\x1b[0m", rule, title, rule);
        } else {
            eprintln!("{}\n{}\n{}", rule, title, rule);
        }
    }

    /// Print an aligned `key: value` row, used for summaries.
    pub fn summary_row(&self, key: &str, value: impl Display) {
        if self.is_quiet() {
            return;
        }
        eprintln!("  {:<15}{}", format!("{}:", key), value);
    }

    /// Print a numbered menu.
    pub fn menu(&self, title: &str, items: &[String]) {
        eprintln!("{}", title);
        for (i, item) in items.iter().enumerate() {
            eprintln!("  {}. {}", i + 1, item);
        }
    }

    /// Wrap prompt text in the prompt color.
    pub fn prompt_text(&self, text: &str) -> String {
        if self.use_color {
            format!("\x1b[1;33m{}\x1b[0m", text)
        } else {
            text.to_string()
        }
    }

    /// Format a status prefix with optional color.
    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();

        if self.use_color {
            format!(
                "{}{:>width$}\x1b[0m",
                status.color_code(),
                text,
                width = STATUS_WIDTH
            )
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal, ColorChoice::Auto)
    }
}
