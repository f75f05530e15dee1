//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// Package a Bazel module for registry distribution
///
/// Meant to be invoked through `bazel run`, which exports the runfiles
/// location the source tree is read from.
#[derive(Parser)]
#[command(name = "bazeldist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// TOML file overriding exclusions, manifest name and markers
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Package this directory instead of the runfiles tree
    #[arg(long)]
    pub root: Option<PathBuf>,

    #[arg(long, env = "RUNFILES_DIR", hide = true)]
    pub runfiles_dir: Option<PathBuf>,

    #[arg(long, env = "RUNFILES_MANIFEST_FILE", hide = true)]
    pub runfiles_manifest_file: Option<PathBuf>,

    /// Staging directory, deleted and recreated on every run
    pub staging_dir: Option<PathBuf>,

    /// Path of the .tar.gz to produce
    pub tarball: Option<PathBuf>,
}
