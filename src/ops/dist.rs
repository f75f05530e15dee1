//! The distribution pipeline.
//!
//! Copies the filtered source tree into a staging directory, strips the
//! development blocks from the manifest, archives the staging directory and
//! removes it again. A failure at any stage aborts the run immediately; the
//! staging directory may be left behind in that case and is cleared at the
//! start of the next run.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::ops::tarball::build_tarball;
use crate::util::fs::{
    copy_file, read_to_string, remove_dir_all_if_exists, remove_file_if_exists, walk_files,
    write_string,
};
use crate::util::hash::sha256_file;
use crate::util::PackConfig;

/// Options for one packaging run.
#[derive(Debug, Clone)]
pub struct DistOptions {
    /// Root of the source tree to package
    pub root: PathBuf,

    /// Staging directory, recreated on every run
    pub staging_dir: PathBuf,

    /// Path of the `.tar.gz` to produce
    pub output: PathBuf,

    /// Exclusion and manifest settings
    pub config: PackConfig,
}

impl DistOptions {
    /// Create options with the default configuration.
    pub fn new(
        root: impl Into<PathBuf>,
        staging_dir: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        DistOptions {
            root: root.into(),
            staging_dir: staging_dir.into(),
            output: output.into(),
            config: PackConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: PackConfig) -> Self {
        self.config = config;
        self
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct DistReport {
    /// The written archive
    pub archive: PathBuf,

    /// Hex SHA256 of the archive
    pub sha256: String,

    /// Archive entry names, in order
    pub entries: Vec<String>,

    /// Files copied verbatim
    pub files_copied: usize,

    /// Manifests passed through the rewriter
    pub manifests_rewritten: usize,

    /// Files rejected by the exclusion rules
    pub files_excluded: usize,
}

/// Pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Cleaning,
    Staging,
    Populating,
    Archiving,
    Cleanup,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Cleaning => "cleaning",
            Stage::Staging => "staging",
            Stage::Populating => "populating",
            Stage::Archiving => "archiving",
            Stage::Cleanup => "cleanup",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

impl Stage {
    fn advance(&mut self, next: Stage) {
        tracing::debug!("{} -> {}", self, next);
        *self = next;
    }
}

/// Run the full pipeline.
///
/// Errors carry the stage the run was aborted in.
pub fn dist(opts: &DistOptions) -> Result<DistReport> {
    let mut stage = Stage::Idle;
    run(opts, &mut stage).with_context(|| format!("aborted while {}", stage))
}

fn run(opts: &DistOptions, stage: &mut Stage) -> Result<DistReport> {
    let staging_name = file_name(&opts.staging_dir)
        .with_context(|| format!("invalid staging directory: {}", opts.staging_dir.display()))?;
    let archive_name = file_name(&opts.output)
        .with_context(|| format!("invalid archive path: {}", opts.output.display()))?;
    ensure_disjoint(&opts.root, &opts.staging_dir)?;

    stage.advance(Stage::Cleaning);
    remove_dir_all_if_exists(&opts.staging_dir)?;

    stage.advance(Stage::Staging);
    std::fs::create_dir_all(&opts.staging_dir).with_context(|| {
        format!(
            "failed to create staging directory: {}",
            opts.staging_dir.display()
        )
    })?;

    stage.advance(Stage::Populating);
    let rules = opts.config.exclusion_rules(&staging_name, &archive_name);
    let rewriter = opts.config.rewriter();

    let mut files_copied = 0;
    let mut manifests_rewritten = 0;
    let mut files_excluded = 0;

    tracing::info!("recursively finding files in {}", opts.root.display());
    tracing::debug!("excluded prefixes: {:?}", rules.dev_prefixes());
    for file in walk_files(&opts.root)? {
        if !rules.include(&file.relative) {
            tracing::debug!("excluding {}", file.relative.display());
            files_excluded += 1;
            continue;
        }

        let dst = opts.staging_dir.join(&file.relative);

        if file.relative.file_name() == Some(OsStr::new(&opts.config.manifest)) {
            let text = read_to_string(&file.path)?;
            let (stripped, blocks) = rewriter.strip(&text);
            write_string(&dst, &stripped)?;

            tracing::info!(
                "rewrote {} -> {} ({} development block(s) removed)",
                file.relative.display(),
                dst.display(),
                blocks
            );
            manifests_rewritten += 1;
            continue;
        }

        tracing::info!("copying file {} -> {}", file.relative.display(), dst.display());
        copy_file(&file.path, &dst)?;
        files_copied += 1;
    }

    stage.advance(Stage::Archiving);
    remove_file_if_exists(&opts.output)?;
    let summary = build_tarball(&opts.staging_dir, &opts.output)?;
    let sha256 = sha256_file(&opts.output)?;
    tracing::info!(
        "archived {} file(s), {} bytes, into {}",
        summary.entries.len(),
        summary.content_size,
        opts.output.display()
    );

    stage.advance(Stage::Cleanup);
    remove_dir_all_if_exists(&opts.staging_dir)?;

    stage.advance(Stage::Done);
    Ok(DistReport {
        archive: opts.output.clone(),
        sha256,
        entries: summary.entries,
        files_copied,
        manifests_rewritten,
        files_excluded,
    })
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Refuse a staging directory that contains the source root, since it is
/// deleted recursively.
fn ensure_disjoint(root: &Path, staging: &Path) -> Result<()> {
    let (Ok(root), Ok(staging)) = (root.canonicalize(), staging.canonicalize()) else {
        return Ok(());
    };

    if root.starts_with(&staging) {
        bail!(
            "staging directory {} contains the source root {}",
            staging.display(),
            root.display()
        );
    }
    Ok(())
}
