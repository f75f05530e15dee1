//! bazeldist CLI - packages a Bazel module for registry distribution

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use bazeldist::core::runfiles::explicit_root;
use bazeldist::{dist, DistOptions, PackConfig, RunfilesEnv, UsageError};
use cli::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("bazeldist=debug")
    } else {
        EnvFilter::new("bazeldist=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let (staging_dir, tarball) = positional_args(&cli)?;

    let config = match &cli.config {
        Some(path) => PackConfig::load(path)?,
        None => PackConfig::default(),
    };

    let root = match &cli.root {
        Some(root) => explicit_root(root)?,
        None => RunfilesEnv::new(cli.runfiles_dir, cli.runfiles_manifest_file)
            .resolve(&config.workspace)?,
    };

    let report = dist(&DistOptions::new(root, staging_dir, tarball).with_config(config))?;

    eprintln!(">> Finished! A tarball of the contents is available");
    eprintln!("     Archive {}", report.archive.display());
    eprintln!("      SHA256 {}", report.sha256);
    eprintln!(
        "       Files {} packaged, {} excluded",
        report.entries.len(),
        report.files_excluded
    );

    Ok(())
}

fn positional_args(cli: &Cli) -> Result<(PathBuf, PathBuf), UsageError> {
    match (&cli.staging_dir, &cli.tarball) {
        (None, _) => Err(UsageError::MissingStagingDir),
        (Some(_), None) => Err(UsageError::MissingArchivePath),
        (Some(staging), Some(tarball)) => Ok((staging.clone(), tarball.clone())),
    }
}
