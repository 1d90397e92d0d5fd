//! Interactive questions.
//!
//! The resolver never reads the terminal directly. It asks through a
//! [`Prompt`], which tests replace with a scripted implementation.

use std::io::{self, BufRead, Write};

use crate::core::RigError;
use crate::util::shell::Shell;

/// The user aborted input (end-of-input or interrupt).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl From<Cancelled> for RigError {
    fn from(_: Cancelled) -> Self {
        RigError::UserCancelled
    }
}

/// A blocking question/answer channel.
pub trait Prompt {
    /// Ask `question`. An empty answer yields `default`.
    fn ask(&mut self, question: &str, default: &str) -> Result<String, Cancelled>;
}

/// Prompt on stderr, answer on stdin.
#[derive(Debug)]
pub struct TerminalPrompt {
    shell: Shell,
}

impl TerminalPrompt {
    pub fn new(shell: &Shell) -> Self {
        TerminalPrompt {
            shell: shell.clone(),
        }
    }
}

impl Prompt for TerminalPrompt {
    fn ask(&mut self, question: &str, default: &str) -> Result<String, Cancelled> {
        let mut stderr = io::stderr();
        write!(stderr, "{}", self.shell.prompt_text(question)).map_err(|_| Cancelled)?;
        stderr.flush().map_err(|_| Cancelled)?;

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => {
                // keep the next output off the prompt line
                eprintln!();
                Err(Cancelled)
            }
            Ok(_) => {
                let answer = line.trim();
                if answer.is_empty() {
                    Ok(default.to_string())
                } else {
                    Ok(answer.to_string())
                }
            }
        }
    }
}

/// Show a numbered menu and return the chosen index.
///
/// An empty answer picks `default`. Invalid answers re-ask.
pub fn select(
    prompt: &mut dyn Prompt,
    shell: &Shell,
    title: &str,
    what: &str,
    items: &[String],
    default: usize,
) -> Result<usize, RigError> {
    shell.menu(title, items);
    let default_answer = (default + 1).to_string();
    let question = format!("Select {} [{}]: ", what, default_answer);

    loop {
        let answer = prompt.ask(&question, &default_answer)?;
        match answer.parse::<usize>() {
            Ok(n) if (1..=items.len()).contains(&n) => return Ok(n - 1),
            _ => shell.error("Invalid choice"),
        }
    }
}

/// Ask a yes/no question.
pub fn confirm(
    prompt: &mut dyn Prompt,
    shell: &Shell,
    question: &str,
    default: bool,
) -> Result<bool, RigError> {
    let suffix = if default { "[Y/n]" } else { "[y/N]" };
    let question = format!("{} {} ", question, suffix);
    let default_answer = if default { "y" } else { "n" };

    loop {
        let answer = prompt.ask(&question, default_answer)?;
        match answer.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => shell.error("Please answer yes or no."),
        }
    }
}
