//! Configuration file support for rigger.
//!
//! rigger reads two configuration files:
//! - Global: `~/.rigger/config.toml` - User-wide defaults
//! - Project: `Rigger.toml` at the project root
//!
//! Project values take precedence over global values, key by key. Command
//! line flags take precedence over both.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{BuildType, CompilerId, GeneratorId};

/// Name of the project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "Rigger.toml";

pub const DEFAULT_TESTS_OPTION: &str = "BUILD_TESTING";
pub const DEFAULT_BUILD_ROOT: &str = "build";
pub const DEFAULT_MSVC_COMPONENT: &str = "Microsoft.VisualStudio.Component.VC.Tools.x86.x64";
pub const DEFAULT_PROFILES_DIR: &str = "conan_profiles";

/// rigger configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RiggerConfig {
    /// Pinned answers that suppress prompts
    pub defaults: DefaultsConfig,

    /// CMake invocation settings
    pub cmake: CmakeConfig,

    /// MSVC discovery settings
    pub msvc: MsvcConfig,

    /// Conan settings
    pub conan: ConanConfig,

    /// Extra system packages per package manager (`apt`, `dnf`, ...)
    pub packages: BTreeMap<String, Vec<String>>,

    /// Optional libraries reported by `rigger deps`
    pub optional: Vec<OptionalLibrary>,
}

/// Values that count as explicit overrides below the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub build_type: Option<BuildType>,
    pub compiler: Option<CompilerId>,
    pub generator: Option<GeneratorId>,
    pub tests: Option<bool>,
    pub use_conan: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CmakeConfig {
    /// Cache variable toggled by the tests flag
    pub tests_option: Option<String>,

    /// Cache variable toggled by the dependency-manager flag
    pub conan_option: Option<String>,

    /// Directory under the project root that holds every build tree
    pub build_root: Option<String>,
}

impl CmakeConfig {
    pub fn tests_option(&self) -> &str {
        self.tests_option.as_deref().unwrap_or(DEFAULT_TESTS_OPTION)
    }

    pub fn build_root(&self) -> &str {
        self.build_root.as_deref().unwrap_or(DEFAULT_BUILD_ROOT)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MsvcConfig {
    /// Architecture argument for vcvarsall.bat (x64, x86, arm64, ...)
    pub arch: Option<String>,

    /// Component an installation must carry to be used
    pub component: Option<String>,
}

impl MsvcConfig {
    pub fn component(&self) -> &str {
        self.component.as_deref().unwrap_or(DEFAULT_MSVC_COMPONENT)
    }
}

/// A version-conditioned Conan profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRule {
    /// Profile file name under `profiles_dir`
    pub name: String,
    pub compiler: CompilerId,
    /// Semver requirement matched against the detected compiler version
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConanConfig {
    pub profiles_dir: Option<String>,
    pub profiles: Option<Vec<ProfileRule>>,
    pub build: Option<Vec<String>>,
    pub remap_relwithdebinfo: Option<bool>,
}

impl ConanConfig {
    pub fn profiles_dir(&self) -> &str {
        self.profiles_dir.as_deref().unwrap_or(DEFAULT_PROFILES_DIR)
    }

    /// Profile rules in match order.
    pub fn profile_rules(&self) -> Vec<ProfileRule> {
        match &self.profiles {
            Some(rules) => rules.clone(),
            None => vec![ProfileRule {
                name: "gcc15".to_string(),
                compiler: CompilerId::Gcc,
                version: ">=15".to_string(),
            }],
        }
    }

    /// Values for `--build=`.
    pub fn build_policies(&self) -> Vec<String> {
        match &self.build {
            Some(policies) => policies.clone(),
            None => vec!["missing".to_string()],
        }
    }

    pub fn remap_relwithdebinfo(&self) -> bool {
        self.remap_relwithdebinfo.unwrap_or(true)
    }
}

/// A library that is nice to have but not required to configure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionalLibrary {
    pub name: String,

    /// pkg-config modules tried in order
    pub pkg_config: Vec<String>,

    /// Programs whose presence implies the library (e.g. `qmake6`)
    pub tools: Vec<String>,
}

impl RiggerConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't
    /// exist or can't be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: RiggerConfig) {
        // Defaults
        merge_opt(&mut self.defaults.build_type, other.defaults.build_type);
        merge_opt(&mut self.defaults.compiler, other.defaults.compiler);
        merge_opt(&mut self.defaults.generator, other.defaults.generator);
        merge_opt(&mut self.defaults.tests, other.defaults.tests);
        merge_opt(&mut self.defaults.use_conan, other.defaults.use_conan);

        // CMake
        merge_opt(&mut self.cmake.tests_option, other.cmake.tests_option);
        merge_opt(&mut self.cmake.conan_option, other.cmake.conan_option);
        merge_opt(&mut self.cmake.build_root, other.cmake.build_root);

        // MSVC
        merge_opt(&mut self.msvc.arch, other.msvc.arch);
        merge_opt(&mut self.msvc.component, other.msvc.component);

        // Conan
        merge_opt(&mut self.conan.profiles_dir, other.conan.profiles_dir);
        merge_opt(&mut self.conan.profiles, other.conan.profiles);
        merge_opt(&mut self.conan.build, other.conan.build);
        merge_opt(
            &mut self.conan.remap_relwithdebinfo,
            other.conan.remap_relwithdebinfo,
        );

        // Per-manager lists replace, they don't append
        self.packages.extend(other.packages);

        if !other.optional.is_empty() {
            self.optional = other.optional;
        }
    }

    /// Extra packages configured for a manager.
    pub fn packages_for(&self, manager: &str) -> &[String] {
        self.packages
            .get(manager)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn merge_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (Rigger.toml)
/// 2. Global config (~/.rigger/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> RiggerConfig {
    let mut config = RiggerConfig::default();

    if let Some(global_path) = global_path {
        config.merge(RiggerConfig::load_or_default(global_path));
    }

    config.merge(RiggerConfig::load_or_default(project_path));

    config
}

/// Load the configuration that applies to a project.
pub fn load_project_config(project_root: &Path) -> RiggerConfig {
    let global = global_config_path();
    load_config(global.as_deref(), &project_config_path(project_root))
}

/// Get the global rigger config directory (~/.rigger).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".rigger"))
}

/// Get the global config path (~/.rigger/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (Rigger.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_FILE)
}
