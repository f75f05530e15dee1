//! Error types for the packaging pipeline.
//!
//! I/O failures are reported through `anyhow` with path context; the two
//! conditions below are distinct because callers react to them differently.

use std::path::PathBuf;

use thiserror::Error;

/// Wrong number of positional arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error(">> a directory must be specified")]
    MissingStagingDir,

    #[error(">> a tarball file must be specified")]
    MissingArchivePath,
}

/// The source root could not be located.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("neither RUNFILES_DIR nor RUNFILES_MANIFEST_FILE is set; run this tool through `bazel run`")]
    NoEnvironment,

    #[error("`{}` has no parent directory", .0.display())]
    NoParent(PathBuf),

    #[error("source root does not exist: {}", .0.display())]
    NotFound(PathBuf),
}
