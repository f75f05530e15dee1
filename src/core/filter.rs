//! Per-file inclusion rules.
//!
//! Prefix checks are plain string prefixes on the root-relative path, so an
//! exclude of `hack` also drops a top-level `hackathon.md`.

use std::path::Path;

/// Fixed predicates deciding which files ship in the distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRules {
    /// Development-tooling prefixes (e.g. `hack`).
    dev_prefixes: Vec<String>,

    /// Name of the staging directory, excluded so reruns never package it.
    staging_name: String,

    /// File name of the output archive.
    archive_name: String,
}

impl ExclusionRules {
    /// Create rules for the given staging directory and archive names.
    pub fn new(
        dev_prefixes: impl IntoIterator<Item = impl Into<String>>,
        staging_name: impl Into<String>,
        archive_name: impl Into<String>,
    ) -> Self {
        ExclusionRules {
            dev_prefixes: dev_prefixes.into_iter().map(Into::into).collect(),
            staging_name: staging_name.into(),
            archive_name: archive_name.into(),
        }
    }

    /// Get the development-tooling prefixes.
    pub fn dev_prefixes(&self) -> &[String] {
        &self.dev_prefixes
    }

    /// Decide whether a regular file at `rel_path` (relative to the source
    /// root) belongs in the distribution.
    pub fn include(&self, rel_path: &Path) -> bool {
        let rel = rel_path.to_string_lossy();

        if self
            .dev_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && rel.starts_with(prefix.as_str()))
        {
            return false;
        }

        if !self.staging_name.is_empty() && rel.starts_with(self.staging_name.as_str()) {
            return false;
        }

        // Guards against picking up the archive itself when it is written
        // inside the source root.
        match rel_path.file_name() {
            Some(name) => !self.archive_name.contains(&*name.to_string_lossy()),
            None => true,
        }
    }
}

/// Decide inclusion with the default single development prefix.
pub fn include(rel_path: &Path, dev_prefix: &str, staging_name: &str, archive_name: &str) -> bool {
    ExclusionRules::new([dev_prefix], staging_name, archive_name).include(rel_path)
}
