//! IR file resolution
//!
//! Presets reference IR files by a path recorded on the machine that saved
//! them. Only the file name is meaningful here; it is searched for
//! recursively below the preset document's directory.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{ConvertError, Result};

/// What to do when more than one file matches a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvePolicy {
    /// Fail with `AmbiguousIrFile`
    #[default]
    Strict,
    /// Use the first match in file-name order
    FirstMatch,
}

/// Locates the file behind an IR reference name
pub trait IrResolver {
    /// Find `file_name` below `root`.
    ///
    /// # Errors
    /// * `IrFileNotFound` - If nothing matches
    /// * `AmbiguousIrFile` - If several files match and the resolver is strict
    /// * `FileRead` - If part of the tree cannot be read and the resolver is strict
    fn resolve(&self, root: &Path, file_name: &str) -> Result<PathBuf>;
}

/// Recursive file-name search over the directory tree
#[derive(Debug, Clone, Default)]
pub struct WalkDirResolver {
    pub policy: ResolvePolicy,
}

impl WalkDirResolver {
    pub fn new(policy: ResolvePolicy) -> Self {
        Self { policy }
    }
}

impl IrResolver for WalkDirResolver {
    fn resolve(&self, root: &Path, file_name: &str) -> Result<PathBuf> {
        let not_found = || ConvertError::IrFileNotFound {
            name: file_name.to_string(),
            root: root.to_path_buf(),
        };

        if file_name.is_empty() {
            return Err(not_found());
        }

        // Sorted traversal keeps FirstMatch reproducible across filesystems
        let mut candidates = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                // An unreadable subtree may hide a second match
                Err(e) if self.policy == ResolvePolicy::Strict => {
                    return Err(ConvertError::FileRead {
                        path: e.path().unwrap_or(root).to_path_buf(),
                        source: e.into(),
                    });
                }
                Err(e) => {
                    warn!("Skipping unreadable entry while searching for {}: {}", file_name, e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || entry.file_name() != file_name {
                continue;
            }
            if self.policy == ResolvePolicy::FirstMatch {
                debug!("Resolved {} -> {}", file_name, entry.path().display());
                return Ok(entry.into_path());
            }
            candidates.push(entry.into_path());
        }

        if candidates.is_empty() {
            return Err(not_found());
        }
        if candidates.len() > 1 {
            return Err(ConvertError::AmbiguousIrFile {
                name: file_name.to_string(),
                root: root.to_path_buf(),
                candidates,
            });
        }

        let resolved = candidates.remove(0);
        debug!("Resolved {} -> {}", file_name, resolved.display());
        Ok(resolved)
    }
}
