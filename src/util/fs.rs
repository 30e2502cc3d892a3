//! Filesystem utilities.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a file through a temporary sibling renamed over the destination.
///
/// Readers never observe a partially written file. Parent directories are
/// created when missing.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;
    let mut tmp = NamedTempFile::new_in(&parent)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    write_atomic(path, contents.as_bytes())
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Files matching a glob pattern relative to `base`, sorted.
///
/// Unreadable entries are skipped with a warning.
pub fn glob_files(base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = base.join(pattern);
    let mut files: Vec<PathBuf> = glob(&full.to_string_lossy())
        .with_context(|| format!("invalid glob pattern `{}`", pattern))?
        .filter_map(|entry| {
            entry
                .map_err(|e| tracing::warn!("skipping {}: {}", e.path().display(), e.error()))
                .ok()
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Every file below a directory, sorted.
pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Path with `/` separators, as written in build manifests.
pub fn to_manifest_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_glob_files() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("ansysNorton.cxx"), "").unwrap();
        fs::write(src.join("umatNorton.cxx"), "").unwrap();
        fs::write(src.join("readme.txt"), "readme").unwrap();

        let files = glob_files(tmp.path(), "src/**/*.cxx").unwrap();
        assert_eq!(files, vec![src.join("ansysNorton.cxx"), src.join("umatNorton.cxx")]);
        assert!(glob_files(tmp.path(), "src/[").is_err());
    }

    #[test]
    fn test_write_atomic_creates_parents_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("include").join("MFront").join("a.hxx");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        // no temporary file is left behind
        assert_eq!(list_files(tmp.path()).len(), 1);
    }

    #[test]
    fn test_relative_manifest_path() {
        let base = Path::new("/out");
        let rel = relative_path(base, Path::new("/out/src/ansysNorton.cxx"));
        assert_eq!(to_manifest_path(&rel), "src/ansysNorton.cxx");
    }
}
