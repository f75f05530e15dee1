//! Deterministic `.tar.gz` creation.
//!
//! Entries are appended in lexicographic order of their relative path and
//! every header is normalized: mtime 0, uid/gid 0, no owner names, and mode
//! `0o755` for executables or `0o644` otherwise. The gzip header carries no
//! timestamp or file name. Identical staging trees therefore produce
//! byte-identical archives.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, EntryType, Header};
use tempfile::NamedTempFile;

use crate::util::fs::{display_name, walk_files};

/// Summary of a written archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarballSummary {
    /// Entry names, in archive order.
    pub entries: Vec<String>,

    /// Sum of the entries' content sizes.
    pub content_size: u64,
}

/// Archive every regular file under `staging` into `output`.
///
/// The archive is written to a temporary file next to `output` and only
/// moved into place once complete, replacing any existing file.
pub fn build_tarball(staging: &Path, output: &Path) -> Result<TarballSummary> {
    let files = walk_files(staging)?;

    let out_dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(out_dir)
        .with_context(|| format!("failed to create temporary archive in {}", out_dir.display()))?;

    let mut entries = Vec::with_capacity(files.len());
    let mut content_size = 0u64;

    let encoder = GzEncoder::new(tmp, Compression::default());
    let mut builder = Builder::new(encoder);

    for file in &files {
        let name = display_name(&file.relative);
        let metadata = std::fs::metadata(&file.path)
            .with_context(|| format!("failed to read metadata: {}", file.path.display()))?;

        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(metadata.len());
        header.set_mode(normalized_mode(&metadata));
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);

        let reader = BufReader::new(
            File::open(&file.path)
                .with_context(|| format!("failed to open file: {}", file.path.display()))?,
        );
        builder
            .append_data(&mut header, &file.relative, reader)
            .with_context(|| format!("failed to add {} to archive", name))?;

        tracing::debug!("archived {}", name);
        content_size += metadata.len();
        entries.push(name);
    }

    let encoder = builder
        .into_inner()
        .context("failed to finish tar stream")?;
    let mut tmp = encoder.finish().context("failed to finish gzip stream")?;
    tmp.flush().context("failed to flush archive")?;

    // Temporary files are created 0o600.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o644))
            .with_context(|| format!("failed to set permissions: {}", tmp.path().display()))?;
    }

    tmp.persist(output)
        .with_context(|| format!("failed to write archive: {}", output.display()))?;

    Ok(TarballSummary {
        entries,
        content_size,
    })
}

#[cfg(unix)]
fn normalized_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    if metadata.permissions().mode() & 0o111 != 0 {
        0o755
    } else {
        0o644
    }
}

#[cfg(not(unix))]
fn normalized_mode(_metadata: &std::fs::Metadata) -> u32 {
    0o644
}
