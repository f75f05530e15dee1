//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// A regular file found below a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Absolute (root-joined) path.
    pub path: PathBuf,

    /// Path relative to the walked root.
    pub relative: PathBuf,
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Remove a file, if it exists.
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("failed to remove file: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Copy one file into `dst`, creating missing parent directories.
///
/// Symlinks are resolved and the target's bytes are copied; the link itself
/// is never reproduced. Permission bits and the modification time of the
/// copied file follow the source.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }

    let real = if src.is_symlink() {
        src.canonicalize()
            .with_context(|| format!("failed to resolve symlink: {}", src.display()))?
    } else {
        src.to_path_buf()
    };

    // `fs::copy` carries permission bits over.
    fs::copy(&real, dst)
        .with_context(|| format!("failed to copy {} to {}", real.display(), dst.display()))?;

    let modified = fs::metadata(&real)
        .and_then(|m| m.modified())
        .with_context(|| format!("failed to read metadata: {}", real.display()))?;
    // Runfiles are often 0o555 and the copy inherits that; a read-only
    // handle is enough for the owner on unix.
    fs::File::options()
        .write(true)
        .open(dst)
        .or_else(|_| fs::File::open(dst))
        .and_then(|f| f.set_modified(modified))
        .with_context(|| format!("failed to set modification time: {}", dst.display()))?;

    Ok(())
}

/// Collect every regular file under `root`, sorted by relative path.
///
/// Symlinks to files count as files; symlinked directories are not
/// descended into.
pub fn walk_files(root: &Path) -> Result<Vec<WalkedFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry =
            entry.with_context(|| format!("failed to walk directory: {}", root.display()))?;

        let is_file = if entry.path_is_symlink() {
            entry.path().is_file()
        } else {
            entry.file_type().is_file()
        };
        if !is_file {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| relative_path(root, entry.path()));

        files.push(WalkedFile {
            path: entry.path().to_path_buf(),
            relative,
        });
    }

    files.sort_by_cached_key(|f| sort_key(&f.relative));
    Ok(files)
}

/// Ordering key for a relative path: the raw component bytes joined by `/`.
///
/// Compared bytewise so non-UTF-8 names never tie.
pub fn sort_key(relative: &Path) -> Vec<u8> {
    let mut key = Vec::new();
    for (i, component) in relative.components().enumerate() {
        if i > 0 {
            key.push(b'/');
        }
        key.extend_from_slice(component.as_os_str().as_encoded_bytes());
    }
    key
}

/// The `/`-joined form of a relative path, for reports and logs.
pub fn display_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_walk_files_sorted_by_full_path() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        fs::write(tmp.path().join("a/b/c.txt"), "c").unwrap();
        fs::write(tmp.path().join("a.txt"), "a").unwrap();
        fs::write(tmp.path().join("Z.md"), "z").unwrap();
        fs::create_dir_all(tmp.path().join("empty")).unwrap();

        let files = walk_files(tmp.path()).unwrap();
        let names: Vec<_> = files.iter().map(|f| display_name(&f.relative)).collect();

        // '.' sorts before '/', so a.txt precedes a/b/c.txt
        assert_eq!(names, vec!["Z.md", "a.txt", "a/b/c.txt"]);
    }

    #[test]
    fn test_copy_file_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("file.txt");
        let dst = tmp.path().join("out/nested/file.txt");
        fs::write(&src, "content").unwrap();

        copy_file(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(&dst).unwrap(), "content");
    }

    #[test]
    fn test_copy_file_preserves_mtime() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("file.txt");
        let dst = tmp.path().join("copy.txt");
        fs::write(&src, "content").unwrap();

        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        fs::File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();

        copy_file(&src, &dst).unwrap();

        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), past);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_file_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("tool.sh");
        let dst = tmp.path().join("copy.sh");
        fs::write(&src, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o755)).unwrap();

        copy_file(&src, &dst).unwrap();

        let mode = fs::metadata(&dst).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_file_resolves_symlinks() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("real.txt");
        let link = tmp.path().join("link.txt");
        let dst = tmp.path().join("out/link.txt");
        fs::write(&target, "real content").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        copy_file(&link, &dst).unwrap();

        assert!(!fs::symlink_metadata(&dst).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "real content");
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_files_follows_file_links_only() {
        let tmp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("real.txt"), "x").unwrap();
        fs::create_dir_all(outside.path().join("dir")).unwrap();
        fs::write(outside.path().join("dir/inner.txt"), "y").unwrap();

        std::os::unix::fs::symlink(outside.path().join("real.txt"), tmp.path().join("link.txt"))
            .unwrap();
        std::os::unix::fs::symlink(outside.path().join("dir"), tmp.path().join("linkdir"))
            .unwrap();

        let files = walk_files(tmp.path()).unwrap();
        let names: Vec<_> = files.iter().map(|f| display_name(&f.relative)).collect();
        assert_eq!(names, vec!["link.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_file_read_only_source_keeps_mtime() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("BUILD.bazel");
        let dst = tmp.path().join("out/BUILD.bazel");
        fs::write(&src, "cc_library()\n").unwrap();

        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(2_000_000);
        fs::File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o444)).unwrap();

        copy_file(&src, &dst).unwrap();

        let metadata = fs::metadata(&dst).unwrap();
        assert_eq!(metadata.modified().unwrap(), past);
        assert_eq!(metadata.permissions().mode() & 0o777, 0o444);
    }

    #[test]
    fn test_sort_key_orders_by_bytes() {
        let mut paths = vec![
            PathBuf::from("a/b.txt"),
            PathBuf::from("a.txt"),
            PathBuf::from("B.md"),
        ];
        paths.sort_by_cached_key(|p| sort_key(p));

        assert_eq!(
            paths,
            vec![
                PathBuf::from("B.md"),
                PathBuf::from("a.txt"),
                PathBuf::from("a/b.txt")
            ]
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_sort_key_distinguishes_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let ff = Path::new(OsStr::from_bytes(b"a\xff.h"));
        let fe = Path::new(OsStr::from_bytes(b"a\xfe.h"));

        assert_eq!(display_name(ff), display_name(fe));
        assert!(sort_key(fe) < sort_key(ff));
    }

    #[test]
    fn test_remove_helpers_tolerate_missing_paths() {
        let tmp = TempDir::new().unwrap();
        remove_dir_all_if_exists(&tmp.path().join("missing")).unwrap();
        remove_file_if_exists(&tmp.path().join("missing.txt")).unwrap();
    }
}
