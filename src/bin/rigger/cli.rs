//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use rigger::core::GeneratorId;
use rigger::util::shell::ColorChoice;
use rigger::{BuildType, CompilerId, Platform};

/// Rigger - resolve and drive the build environment of a C++ project
#[derive(Parser)]
#[command(name = "rigger")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the build configuration and run CMake
    Configure(ConfigureArgs),

    /// Check prerequisites and install dependencies
    Deps(DepsArgs),

    /// Build a configured tree
    Build(BuildArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Build type: Debug, Release, RelWithDebInfo
    #[arg(short = 't', long)]
    pub build_type: Option<BuildType>,

    /// Compiler: gcc, clang, clang-cl, msvc
    #[arg(short, long)]
    pub compiler: Option<CompilerId>,

    /// CMake generator, e.g. "Ninja" or "Visual Studio 17 2022"
    #[arg(short = 'b', long = "build-system")]
    pub generator: Option<GeneratorId>,

    /// Platform component of the build directory
    #[arg(long)]
    pub platform: Option<Platform>,

    /// Build tests
    #[arg(long, conflicts_with = "no_tests")]
    pub tests: bool,

    /// Do not build tests
    #[arg(long)]
    pub no_tests: bool,

    /// Install dependencies with Conan
    #[arg(long, conflicts_with = "no_conan")]
    pub use_conan: bool,

    /// Do not use Conan
    #[arg(long)]
    pub no_conan: bool,

    /// Remove the build directory first
    #[arg(long)]
    pub clean: bool,

    /// Never prompt; undecided values are auto-detected
    #[arg(long, env = "RIGGER_NO_INTERACTIVE")]
    pub no_interactive: bool,

    /// Extra CMake arguments, whitespace separated
    #[arg(long, allow_hyphen_values = true)]
    pub cmake_args: Option<String>,

    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Conan profile file
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Install Conan with pip if it is missing
    #[arg(long)]
    pub install_conan: bool,

    /// Build after configuring
    #[arg(long)]
    pub build: bool,

    /// Number of parallel jobs for --build
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Arguments passed to CMake verbatim
    #[arg(last = true)]
    pub extra: Vec<String>,
}

#[derive(Args)]
pub struct DepsArgs {
    /// Install dependencies with Conan instead of the system package manager
    #[arg(long)]
    pub use_conan: bool,

    /// Build type the Conan packages are installed for
    #[arg(short = 't', long, default_value = "Release")]
    pub build_type: BuildType,

    /// Compiler the Conan profile is chosen for
    #[arg(short, long)]
    pub compiler: Option<CompilerId>,

    /// Platform component of the output directory
    #[arg(long)]
    pub platform: Option<Platform>,

    /// Conan profile file
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Install Conan with pip if it is missing
    #[arg(long)]
    pub install_conan: bool,

    /// Never prompt
    #[arg(long, env = "RIGGER_NO_INTERACTIVE")]
    pub no_interactive: bool,

    /// Only run the prerequisite checks
    #[arg(long)]
    pub check_only: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub source: Option<PathBuf>,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Build type of the tree to build
    #[arg(short = 't', long, default_value = "Release")]
    pub build_type: BuildType,

    /// Platform component of the build directory
    #[arg(long)]
    pub platform: Option<Platform>,

    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Specific targets to build
    #[arg(long)]
    pub target: Vec<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
