//! Script registry: tracked files, per-file versions and content snapshots.
//!
//! The registry is the [`SourceHost`] handed to the frontend. Versions are
//! the frontend's cache key: a file is re-parsed only when its version
//! string changes.
//!
//! Two paths bump a version:
//! - [`ScriptRegistry::ensure_tracked`] bumps unconditionally (the analyzer
//!   was asked to look at the file again).
//! - [`SourceHost::script_version`] bumps when the file's modification time
//!   moved past the recorded one.
//!
//! Library files (anything under `node_modules`) are read once and then
//! served from memory for the life of the process.

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use tsu_checker::SourceHost;
use tsu_common::paths::{is_library_path, normalize_path};

/// Version state of one file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptVersion {
    pub version: u64,
    pub modified_time: SystemTime,
}

/// The modification time of a file could not be read.
#[derive(Debug)]
pub struct RegistryError {
    pub path: String,
    pub source: io::Error,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to get last modified time for: '{}'", self.path)
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[derive(Default)]
pub struct ScriptRegistry {
    /// Ambient declaration files from the project configuration.
    declaration_files: Vec<String>,
    /// Files the analyzer was asked about, in first-request order.
    tracked: IndexSet<String>,
    versions: FxHashMap<String, ScriptVersion>,
    library_snapshots: FxHashMap<String, Arc<str>>,
}

impl ScriptRegistry {
    pub fn new(declaration_files: Vec<String>) -> Self {
        ScriptRegistry {
            declaration_files: declaration_files.iter().map(|p| normalize_path(p)).collect(),
            ..ScriptRegistry::default()
        }
    }

    pub fn modified_time(path: &str) -> Result<SystemTime, RegistryError> {
        std::fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .map_err(|source| RegistryError {
                path: path.to_string(),
                source,
            })
    }

    /// Start tracking `path`, or bump its version if it is already known.
    /// Returns the new version.
    pub fn ensure_tracked(&mut self, path: &str, modified_time: SystemTime) -> u64 {
        let path = normalize_path(path);
        let version = match self.versions.get_mut(&path) {
            Some(entry) => {
                entry.version += 1;
                entry.version
            }
            None => {
                self.versions.insert(
                    path.clone(),
                    ScriptVersion {
                        version: 0,
                        modified_time,
                    },
                );
                0
            }
        };
        if self.tracked.insert(path.clone()) {
            debug!(%path, "tracking script");
        }
        trace!(%path, version, "script version");
        version
    }

    /// Record the modification time a successful analysis was based on.
    pub fn mark_analyzed(&mut self, path: &str, modified_time: SystemTime) {
        if let Some(entry) = self.versions.get_mut(&normalize_path(path)) {
            entry.modified_time = modified_time;
        }
    }

    pub fn version_of(&self, path: &str) -> Option<ScriptVersion> {
        self.versions.get(&normalize_path(path)).copied()
    }

    pub fn tracked_files(&self) -> impl Iterator<Item = &str> {
        self.tracked.iter().map(String::as_str)
    }

    pub fn is_tracked(&self, path: &str) -> bool {
        self.tracked.contains(&normalize_path(path))
    }

    /// Bump the version of `path` when its modification time is newer than
    /// the recorded one. Unknown files start at version 0; missing files
    /// have no version.
    fn refresh_version(&mut self, path: &str) -> Option<u64> {
        // Missing files keep their recorded version.
        let modified_time = Self::modified_time(path).ok()?;
        let entry = self
            .versions
            .entry(path.to_string())
            .or_insert(ScriptVersion {
                version: 0,
                modified_time,
            });
        if modified_time > entry.modified_time {
            entry.modified_time = modified_time;
            entry.version += 1;
            debug!(%path, version = entry.version, "script modified on disk");
        }
        Some(entry.version)
    }
}

impl SourceHost for ScriptRegistry {
    fn root_file_names(&self) -> Vec<String> {
        let mut roots = self.declaration_files.clone();
        roots.extend(self.tracked.iter().cloned());
        roots
    }

    fn script_version(&mut self, path: &str) -> Option<String> {
        if self.library_snapshots.contains_key(path) {
            return Some(self.versions.get(path).map_or(0, |v| v.version).to_string());
        }
        self.refresh_version(path).map(|version| version.to_string())
    }

    fn script_snapshot(&mut self, path: &str) -> Option<Arc<str>> {
        if let Some(snapshot) = self.library_snapshots.get(path) {
            trace!(%path, "library snapshot cache hit");
            return Some(Arc::clone(snapshot));
        }
        let text: Arc<str> = match std::fs::read_to_string(path) {
            Ok(text) => Arc::from(text),
            Err(err) => {
                debug!(%path, %err, "failed to read script");
                return None;
            }
        };
        if is_library_path(path) {
            self.library_snapshots
                .insert(path.to_string(), Arc::clone(&text));
        }
        Some(text)
    }

    fn file_exists(&self, path: &str) -> bool {
        self.library_snapshots.contains_key(path) || Path::new(path).is_file()
    }
}

#[cfg(test)]
#[path = "../tests/registry_tests.rs"]
mod tests;
