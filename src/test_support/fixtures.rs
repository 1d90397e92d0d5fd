//! Test fixtures for common scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::ToolchainEnvironment;
use crate::toolchain::Host;
use crate::util::config::RiggerConfig;
use crate::util::context::GlobalContext;
use crate::util::process::Executor;
use crate::util::shell::Shell;

/// A minimal CMake project in a temporary directory.
pub fn cmake_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("CMakeLists.txt"),
        "cmake_minimum_required(VERSION 3.25)\nproject(demo CXX)\n",
    )
    .unwrap();
    tmp
}

/// Create an empty file, creating parent directories as needed.
pub fn touch(path: &Path) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "").unwrap();
    path.to_path_buf()
}

/// An environment with only PATH set.
pub fn env_with_path(path: &str) -> ToolchainEnvironment {
    ToolchainEnvironment::from_vars([("PATH", path)])
}

/// `set` output as printed by cmd.exe after vcvarsall.bat.
pub fn vcvars_dump() -> &'static str {
    "INCLUDE=C:\\VS\\VC\\Tools\\MSVC\\14.38\\include\r\n\
     LIB=C:\\VS\\VC\\Tools\\MSVC\\14.38\\lib\\x64\r\n\
     Path=C:\\VS\\VC\\Tools\\MSVC\\14.38\\bin\\Hostx64\\x64;C:\\Windows\\system32\r\n\
     VSCMD_ARG_TGT_ARCH=x64\r\n"
}

/// A context for `root` on `host` that sees nothing of the real machine:
/// empty environment, default configuration, no Visual Studio or LLVM
/// search roots.
pub fn isolated_context<'a>(
    exec: &'a dyn Executor,
    shell: &'a Shell,
    root: &Path,
    host: Host,
) -> GlobalContext<'a> {
    GlobalContext::new(exec, shell, root)
        .unwrap()
        .with_host(host)
        .with_environment(ToolchainEnvironment::default())
        .with_config(RiggerConfig::default())
        .with_known_roots(Vec::new(), Vec::new())
}
