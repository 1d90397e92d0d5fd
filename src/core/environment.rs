//! Process environment snapshots.
//!
//! Subprocesses never inherit the ambient environment implicitly. A run
//! captures the current environment once, detection may produce a new
//! snapshot (PATH prepended, or an MSVC environment extracted from the
//! vendor setup script), and that snapshot is handed to every later
//! subprocess.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

/// An immutable mapping from variable name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainEnvironment {
    vars: BTreeMap<String, String>,
}

impl ToolchainEnvironment {
    /// Snapshot the current process environment.
    pub fn from_current() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    /// Build a snapshot from raw OS pairs. Variables whose name or value is
    /// not valid Unicode cannot be carried and are skipped with a debug log.
    pub fn from_os_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut map = BTreeMap::new();
        for (key, value) in vars {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => {
                    map.insert(key, value);
                }
                (Ok(key), Err(_)) => {
                    tracing::debug!("skipping environment variable {} with non-UTF-8 value", key);
                }
                (Err(key), _) => {
                    tracing::debug!(
                        "skipping environment variable with non-UTF-8 name {}",
                        key.to_string_lossy()
                    );
                }
            }
        }
        ToolchainEnvironment { vars: map }
    }

    /// Build a snapshot from explicit pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        ToolchainEnvironment {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Look up a variable. Exact match first, then a case-insensitive match
    /// (Windows reports `Path` where POSIX code expects `PATH`).
    pub fn get(&self, key: &str) -> Option<&str> {
        if let Some(v) = self.vars.get(key) {
            return Some(v.as_str());
        }
        self.vars
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The executable search path.
    pub fn path(&self) -> Option<&str> {
        self.get("PATH")
    }

    /// A new snapshot with `dir` in front of the search path.
    pub fn with_path_prepended(&self, dir: &Path) -> Self {
        let key = self
            .vars
            .keys()
            .find(|k| k.eq_ignore_ascii_case("PATH"))
            .cloned()
            .unwrap_or_else(|| "PATH".to_string());

        let mut entries: Vec<OsString> = vec![dir.as_os_str().to_os_string()];
        if let Some(existing) = self.path() {
            entries.extend(std::env::split_paths(existing).map(|p| p.into_os_string()));
        }
        let joined = std::env::join_paths(entries)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|_| dir.display().to_string());

        let mut vars = self.vars.clone();
        vars.insert(key, joined);
        ToolchainEnvironment { vars }
    }

    /// A new snapshot with one variable set.
    pub fn with_var(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut vars = self.vars.clone();
        vars.insert(key.into(), value.into());
        ToolchainEnvironment { vars }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Parse the output of an environment dump (`set` on Windows, `env`
/// elsewhere) into a snapshot.
///
/// Each `NAME=VALUE` line becomes one entry; the value may itself contain
/// `=`. Lines without `=` and lines with an empty name are ignored. A
/// trailing carriage return is stripped.
pub fn parse_environment_dump(dump: &str) -> ToolchainEnvironment {
    let vars = dump
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter_map(|line| line.split_once('='))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    ToolchainEnvironment { vars }
}
