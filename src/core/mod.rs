//! Pure building blocks of the distribution pipeline.

pub mod errors;
pub mod filter;
pub mod manifest;
pub mod runfiles;

pub use errors::{ResolutionError, UsageError};
pub use filter::ExclusionRules;
pub use manifest::ManifestRewriter;
pub use runfiles::RunfilesEnv;
