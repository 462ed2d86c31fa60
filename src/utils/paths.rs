//! Path utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Resolve the project root: the given directory, or the current directory.
/// The result is canonical and absolute.
pub fn resolve_project_root(root: Option<&Path>) -> Result<PathBuf> {
    let dir = match root {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    if !dir.is_dir() {
        anyhow::bail!("Project root {} is not a directory", dir.display());
    }

    dir.canonicalize()
        .with_context(|| format!("Failed to resolve project root {}", dir.display()))
}

/// Ensure a directory exists
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Total size in bytes of the files under a path
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.metadata().ok())
        .filter(|metadata| metadata.is_file())
        .map(|metadata| metadata.len())
        .sum()
}

pub fn format_size(size_bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size_bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0.00 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_dir_size_and_ensure_dir() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a/b");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        std::fs::write(nested.join("one"), [0u8; 10]).unwrap();
        std::fs::write(temp.path().join("two"), [0u8; 5]).unwrap();

        assert_eq!(dir_size(temp.path()), 15);
        assert_eq!(dir_size(&temp.path().join("missing")), 0);
    }

    #[test]
    fn test_resolve_project_root() {
        let temp = tempfile::tempdir().unwrap();
        let root = resolve_project_root(Some(temp.path())).unwrap();
        assert!(root.is_absolute());
        assert_eq!(root, temp.path().canonicalize().unwrap());
        assert!(resolve_project_root(Some(&temp.path().join("nope"))).is_err());
    }
}
