//! Reader for `CMakeCache.txt`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::fs::read_to_string;

pub const CACHE_FILE: &str = "CMakeCache.txt";

/// One `NAME:TYPE=VALUE` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub kind: String,
    pub value: String,
}

/// Parsed cache of a configured build directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CMakeCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl CMakeCache {
    /// Parse cache text. Comments (`#`, `//`) and malformed lines are skipped.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("//"))
            .filter_map(|line| {
                let (key, value) = line.split_once('=')?;
                let (name, kind) = key.split_once(':')?;
                Some((
                    name.to_string(),
                    CacheEntry {
                        kind: kind.to_string(),
                        value: value.to_string(),
                    },
                ))
            })
            .collect();
        CMakeCache { entries }
    }

    /// Load the cache of `build_dir`. `Ok(None)` when the directory has not
    /// been configured.
    pub fn load(build_dir: &Path) -> Result<Option<Self>> {
        let path = cache_path(build_dir);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(Self::parse(&read_to_string(&path)?)))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|e| e.value.as_str())
    }

    pub fn entry(&self, name: &str) -> Option<&CacheEntry> {
        self.entries.get(name)
    }

    pub fn generator(&self) -> Option<&str> {
        self.get("CMAKE_GENERATOR")
    }

    pub fn cxx_compiler(&self) -> Option<&str> {
        self.get("CMAKE_CXX_COMPILER")
    }

    /// Whether the tree was configured for cl.exe.
    pub fn uses_msvc(&self) -> bool {
        self.cxx_compiler()
            .and_then(|c| Path::new(&c.replace('\\', "/")).file_stem().map(|s| s.to_os_string()))
            .map_or(false, |stem| stem.eq_ignore_ascii_case("cl"))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn cache_path(build_dir: &Path) -> PathBuf {
    build_dir.join(CACHE_FILE)
}
