//! Locating the materialized source tree.
//!
//! Under `bazel run` the tool's files live in its runfiles tree. Bazel
//! exports either `RUNFILES_DIR` (`.../bazeldist.runfiles`) or
//! `RUNFILES_MANIFEST_FILE` (`.../bazeldist.runfiles_manifest`); in both
//! cases the parent directory joined with the workspace subdirectory yields
//! the main repository.

use std::path::{Path, PathBuf};

use crate::core::errors::ResolutionError;

/// Default subdirectory, relative to the runfiles parent, holding the main
/// repository.
pub const DEFAULT_WORKSPACE: &str = "bazeldist.runfiles/_main";

/// Runfiles locations captured once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunfilesEnv {
    /// Value of `RUNFILES_DIR`.
    pub runfiles_dir: Option<PathBuf>,

    /// Value of `RUNFILES_MANIFEST_FILE`.
    pub manifest_file: Option<PathBuf>,
}

impl RunfilesEnv {
    /// Create from explicit values.
    pub fn new(runfiles_dir: Option<PathBuf>, manifest_file: Option<PathBuf>) -> Self {
        RunfilesEnv {
            runfiles_dir,
            manifest_file,
        }
    }

    /// The location to derive the root from. `RUNFILES_DIR` wins; empty
    /// values count as unset.
    fn signal(&self) -> Option<&Path> {
        [&self.runfiles_dir, &self.manifest_file]
            .into_iter()
            .flatten()
            .map(PathBuf::as_path)
            .find(|p| !p.as_os_str().is_empty())
    }

    /// Resolve the source root, appending `workspace` to the parent of the
    /// runfiles signal.
    pub fn resolve(&self, workspace: &Path) -> Result<PathBuf, ResolutionError> {
        let signal = self.signal().ok_or(ResolutionError::NoEnvironment)?;
        let parent = signal
            .parent()
            .ok_or_else(|| ResolutionError::NoParent(signal.to_path_buf()))?;

        let root = parent.join(workspace);
        if !root.is_dir() {
            return Err(ResolutionError::NotFound(root));
        }

        tracing::debug!("resolved source root {}", root.display());
        Ok(root)
    }
}

/// Use an explicitly given root, checking that it exists.
pub fn explicit_root(root: &Path) -> Result<PathBuf, ResolutionError> {
    if root.is_dir() {
        Ok(root.to_path_buf())
    } else {
        Err(ResolutionError::NotFound(root.to_path_buf()))
    }
}
