//! Core data model: configuration, environment snapshots, errors.

pub mod config;
pub mod environment;
pub mod error;

pub use config::{
    build_dir_for, BuildType, CompilerId, ConfigRequest, GeneratorChoice, GeneratorId, Platform,
    ResolvedConfig,
};
pub use environment::{parse_environment_dump, ToolchainEnvironment};
pub use error::RigError;
