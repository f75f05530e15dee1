//! Configuration file support.
//!
//! Everything has a default matching the Violet repository layout, so the
//! file is optional. Example:
//!
//! ```toml
//! exclude = ["hack", ".github", "patches"]
//! manifest = "MODULE.bazel"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::manifest::{END_MARKER, START_MARKER};
use crate::core::runfiles::DEFAULT_WORKSPACE;
use crate::core::{ExclusionRules, ManifestRewriter};

/// Packaging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Development-tooling path prefixes left out of the distribution
    pub exclude: Vec<String>,

    /// Base name of the manifest whose development blocks are stripped
    pub manifest: String,

    /// Marker opening a development-only block
    pub start_marker: String,

    /// Marker closing a development-only block
    pub end_marker: String,

    /// Subdirectory, relative to the runfiles parent, holding the source tree
    pub workspace: PathBuf,
}

impl Default for PackConfig {
    fn default() -> Self {
        PackConfig {
            exclude: vec!["hack".to_string()],
            manifest: "MODULE.bazel".to_string(),
            start_marker: START_MARKER.to_string(),
            end_marker: END_MARKER.to_string(),
            workspace: PathBuf::from(DEFAULT_WORKSPACE),
        }
    }
}

impl PackConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Build the exclusion rules for one run.
    pub fn exclusion_rules(&self, staging_name: &str, archive_name: &str) -> ExclusionRules {
        ExclusionRules::new(self.exclude.iter().cloned(), staging_name, archive_name)
    }

    /// Build the manifest rewriter.
    pub fn rewriter(&self) -> ManifestRewriter {
        ManifestRewriter::new(&self.start_marker, &self.end_marker)
    }
}
