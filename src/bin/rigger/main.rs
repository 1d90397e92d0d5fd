//! Rigger CLI - build environment resolution for C++ projects

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use rigger::util::Shell;
use rigger::RigError;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("rigger=debug")
    } else {
        EnvFilter::new("rigger=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);

    if let Err(e) = run(cli.command, &shell) {
        std::process::exit(report(&e, &shell));
    }
}

fn run(command: Commands, shell: &Shell) -> Result<()> {
    match command {
        Commands::Configure(args) => commands::configure::execute(args, shell),
        Commands::Deps(args) => commands::deps::execute(args, shell),
        Commands::Build(args) => commands::build::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print the failure and pick the exit code.
fn report(e: &anyhow::Error, shell: &Shell) -> i32 {
    match e.downcast_ref::<RigError>() {
        Some(err) => {
            shell.diagnostic(&err.to_diagnostic());
            err.exit_code()
        }
        None => {
            eprintln!("error: {:#}", e);
            1
        }
    }
}
