//! `rigger configure` command

use anyhow::Result;

use crate::cli::ConfigureArgs;
use crate::commands::source_dir;
use rigger::ops::{configure, ConfigureOptions};
use rigger::util::{GlobalContext, Shell, SystemExecutor, TerminalPrompt};
use rigger::ConfigRequest;

pub fn execute(args: ConfigureArgs, shell: &Shell) -> Result<()> {
    let exec = SystemExecutor;
    let ctx = GlobalContext::new(&exec, shell, &source_dir(args.source))?;

    let mut request = ConfigRequest::new(ctx.project_root());
    request.build_type = args.build_type;
    request.compiler = args.compiler;
    request.generator = args.generator;
    request.platform = args.platform;
    request.build_tests = flag_pair(args.tests, args.no_tests);
    request.use_dependency_manager = flag_pair(args.use_conan, args.no_conan);
    request.clean = args.clean;
    request.interactive = !args.no_interactive;
    request.extra_args = cmake_args(args.cmake_args.as_deref(), args.extra);

    let mut options = ConfigureOptions::new(request);
    options.profile = args.profile;
    options.install_conan = args.install_conan;
    options.build = args.build;
    options.jobs = args.jobs;

    let mut prompt = TerminalPrompt::new(shell);
    configure(&ctx, options, &mut prompt)?;
    Ok(())
}

/// `--x` / `--no-x` into a pinned value, `None` when neither was given.
fn flag_pair(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// `--cmake-args` split on whitespace, followed by everything after `--`.
fn cmake_args(joined: Option<&str>, trailing: Vec<String>) -> Vec<String> {
    joined
        .into_iter()
        .flat_map(str::split_whitespace)
        .map(String::from)
        .chain(trailing)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_pair() {
        assert_eq!(flag_pair(true, false), Some(true));
        assert_eq!(flag_pair(false, true), Some(false));
        assert_eq!(flag_pair(false, false), None);
    }

    #[test]
    fn test_cmake_args_order() {
        let args = cmake_args(
            Some(" -DFOO=1   -DBAR=2 "),
            vec!["-DBAZ=3".to_string()],
        );
        assert_eq!(args, vec!["-DFOO=1", "-DBAR=2", "-DBAZ=3"]);
        assert!(cmake_args(None, Vec::new()).is_empty());
    }
}
