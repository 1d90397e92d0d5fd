//! `rigger build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use crate::commands::source_dir;
use rigger::ops::{build, BuildOptions};
use rigger::util::{GlobalContext, Shell, SystemExecutor};

pub fn execute(args: BuildArgs, shell: &Shell) -> Result<()> {
    let exec = SystemExecutor;
    let ctx = GlobalContext::new(&exec, shell, &source_dir(args.source))?;

    let options = BuildOptions {
        build_type: args.build_type,
        platform: args.platform,
        jobs: args.jobs,
        targets: args.target,
    };

    build(&ctx, &options)
}
