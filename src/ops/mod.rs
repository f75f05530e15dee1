//! High-level operations.

pub mod dist;
pub mod tarball;

pub use dist::{dist, DistOptions, DistReport, Stage};
pub use tarball::{build_tarball, TarballSummary};
