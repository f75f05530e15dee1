//! bazeldist - prepares a Bazel module for registry distribution
//!
//! Copies a source tree without its development tooling, strips the
//! development-only block from `MODULE.bazel`, and packs the result into a
//! reproducible `.tar.gz`.

pub mod core;
pub mod ops;
pub mod util;

pub use crate::core::{ExclusionRules, ManifestRewriter, ResolutionError, RunfilesEnv, UsageError};
pub use ops::{dist, DistOptions, DistReport};
pub use util::PackConfig;
