//! `rigger deps` command

use anyhow::Result;

use crate::cli::DepsArgs;
use crate::commands::source_dir;
use rigger::ops::{install_deps, DepsOptions};
use rigger::util::{GlobalContext, Shell, SystemExecutor, TerminalPrompt};

pub fn execute(args: DepsArgs, shell: &Shell) -> Result<()> {
    let exec = SystemExecutor;
    let ctx = GlobalContext::new(&exec, shell, &source_dir(args.source))?;

    let options = DepsOptions {
        use_conan: args.use_conan,
        build_type: args.build_type,
        compiler: args.compiler,
        platform: args.platform,
        profile: args.profile,
        install_conan: args.install_conan,
        interactive: !args.no_interactive,
        check_only: args.check_only,
    };

    let mut prompt = TerminalPrompt::new(shell);
    install_deps(&ctx, &options, &mut prompt)
}
