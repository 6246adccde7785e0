//! Locating the packaged source tree and staging a disposable copy of it.

use globset::Glob;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::StageConfig;

/// Failure to locate or copy the packaged source subtree.
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("invalid glob pattern {pattern:?}: {source}")]
    BadPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("no directory matching {pattern:?} under {root}")]
    NoMatch { pattern: String, root: String },
    #[error("glob pattern {pattern:?} is ambiguous, matched {matches:?}")]
    AmbiguousMatch {
        pattern: String,
        matches: Vec<String>,
    },
    #[error("package subtree {path} does not exist or is not a directory")]
    MissingSubtree { path: String },
    #[error("copy failed at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to create or remove the staging directory itself.
#[derive(Debug, Error)]
#[error("filesystem operation {operation} failed at {path}: {source}")]
pub struct FilesystemError {
    pub operation: &'static str,
    pub path: String,
    #[source]
    pub source: std::io::Error,
}

/// Staging directory with scoped cleanup.
///
/// Dropping the guard removes the directory best-effort, so every failure path
/// after staging leaves no stale copy behind. The success path calls
/// [`StagedTree::remove`] instead, which reports a removal failure.
#[derive(Debug)]
pub struct StagedTree {
    path: PathBuf,
    cleanup_on_drop: bool,
}

impl StagedTree {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            cleanup_on_drop: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the staging directory, consuming the guard.
    pub fn remove(mut self) -> Result<(), FilesystemError> {
        self.cleanup_on_drop = false;
        fs::remove_dir_all(&self.path).map_err(|e| FilesystemError {
            operation: "remove_staging_dir",
            path: self.path.display().to_string(),
            source: e,
        })?;
        debug!(path = %self.path.display(), "Removed staging directory");
        Ok(())
    }
}

impl Drop for StagedTree {
    fn drop(&mut self) {
        if !self.cleanup_on_drop {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.path) {
            warn!(
                error = ?e,
                path = %self.path.display(),
                "Failed to remove staging directory during cleanup"
            );
        } else {
            debug!(path = %self.path.display(), "Removed staging directory during cleanup");
        }
    }
}

/// Expand the configured glob over the source root and return the
/// documentation input subtree inside the single matching directory.
pub fn locate_package_dir(config: &StageConfig) -> Result<PathBuf, CopyError> {
    let pattern = &config.package_glob;
    let matcher = Glob::new(pattern)
        .map_err(|e| {
            error!(pattern = %pattern, error = ?e, "Invalid package glob pattern");
            CopyError::BadPattern {
                pattern: pattern.clone(),
                source: e,
            }
        })?
        .compile_matcher();

    let entries = fs::read_dir(&config.source_root).map_err(|e| {
        error!(
            error = ?e,
            path = %config.source_root.display(),
            "Failed to read source root directory"
        );
        CopyError::Io {
            path: config.source_root.display().to_string(),
            source: e,
        }
    })?;

    let mut matches: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CopyError::Io {
            path: config.source_root.display().to_string(),
            source: e,
        })?;
        if entry.path().is_dir() && matcher.is_match(entry.file_name()) {
            matches.push(entry.path());
        }
    }
    matches.sort();

    let versioned_dir = match matches.len() {
        0 => {
            error!(
                pattern = %pattern,
                root = %config.source_root.display(),
                "No versioned package directory matched"
            );
            return Err(CopyError::NoMatch {
                pattern: pattern.clone(),
                root: config.source_root.display().to_string(),
            });
        }
        1 => matches.remove(0),
        _ => {
            error!(
                pattern = %pattern,
                matches = ?matches,
                "Multiple versioned package directories matched"
            );
            return Err(CopyError::AmbiguousMatch {
                pattern: pattern.clone(),
                matches: matches.iter().map(|p| p.display().to_string()).collect(),
            });
        }
    };

    let package_dir = versioned_dir.join(&config.package_subpath);
    if !package_dir.is_dir() {
        error!(
            path = %package_dir.display(),
            "Matched versioned directory does not contain the package subtree"
        );
        return Err(CopyError::MissingSubtree {
            path: package_dir.display().to_string(),
        });
    }

    debug!(
        package_dir = %package_dir.display(),
        "Located package source directory"
    );
    Ok(package_dir)
}

/// Create the staging directory, wiping any stale copy a previous failed run
/// left behind so the fresh copy never merges into old content.
pub fn prepare_staging(config: &StageConfig) -> Result<StagedTree, FilesystemError> {
    let staging_dir = &config.staging_dir;

    if staging_dir.exists() {
        warn!(
            path = %staging_dir.display(),
            "Stale staging directory found, removing before staging"
        );
        fs::remove_dir_all(staging_dir).map_err(|e| {
            error!(
                error = ?e,
                path = %staging_dir.display(),
                "Failed to remove stale staging directory"
            );
            FilesystemError {
                operation: "remove_stale_staging",
                path: staging_dir.display().to_string(),
                source: e,
            }
        })?;
    }

    fs::create_dir_all(staging_dir).map_err(|e| {
        error!(
            error = ?e,
            path = %staging_dir.display(),
            "Failed to create staging directory"
        );
        FilesystemError {
            operation: "create_staging_dir",
            path: staging_dir.display().to_string(),
            source: e,
        }
    })?;

    debug!(path = %staging_dir.display(), "Created staging directory");
    Ok(StagedTree::new(staging_dir.clone()))
}

/// Recursively copy the source subtree into the destination, returning the
/// number of files copied. The source is never mutated.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<usize, CopyError> {
    fn visit(src: &Path, dst: &Path, copied: &mut usize) -> Result<(), CopyError> {
        let entries = fs::read_dir(src).map_err(|e| CopyError::Io {
            path: src.display().to_string(),
            source: e,
        })?;
        for entry_res in entries {
            let entry = entry_res.map_err(|e| CopyError::Io {
                path: src.display().to_string(),
                source: e,
            })?;
            let from = entry.path();
            let to = dst.join(entry.file_name());
            let file_type = entry.file_type().map_err(|e| CopyError::Io {
                path: from.display().to_string(),
                source: e,
            })?;
            if file_type.is_dir() {
                fs::create_dir_all(&to).map_err(|e| CopyError::Io {
                    path: to.display().to_string(),
                    source: e,
                })?;
                visit(&from, &to, copied)?;
            } else {
                // Symlinks are followed; a broken link surfaces as a copy failure.
                fs::copy(&from, &to).map_err(|e| {
                    error!(
                        error = ?e,
                        path = %from.display(),
                        "Failed to copy file into staging"
                    );
                    CopyError::Io {
                        path: from.display().to_string(),
                        source: e,
                    }
                })?;
                *copied += 1;
            }
        }
        Ok(())
    }

    let mut copied = 0;
    visit(source, dest, &mut copied)?;
    debug!(
        files = copied,
        source = %source.display(),
        dest = %dest.display(),
        "Recursive copy complete"
    );
    Ok(copied)
}
