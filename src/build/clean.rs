//! Stale artifact removal and destination directory setup

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::ProjectLayout;
use crate::utils::paths::{dir_size, ensure_dir, format_size};

/// A path removed during cleanup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed {
    pub path: PathBuf,
    pub size: u64,
}

/// Remove the previous bundle file and the whole Gradle output tree.
///
/// Paths that are already gone are skipped. Returns what was removed.
pub fn clean_previous_build(layout: &ProjectLayout, verbose: bool) -> Result<Vec<Removed>> {
    let mut removed = Vec::new();

    if let Some(size) = remove_file_if_exists(&layout.bundle_file)? {
        removed.push(Removed {
            path: layout.bundle_file.clone(),
            size,
        });
    }

    if let Some(size) = remove_dir_if_exists(&layout.build_output_dir)? {
        removed.push(Removed {
            path: layout.build_output_dir.clone(),
            size,
        });
    }

    if verbose {
        for entry in &removed {
            eprintln!(
                "  Removed: {} ({})",
                entry.path.display(),
                format_size(entry.size)
            );
        }
    }

    Ok(removed)
}

/// Create the bundle and asset destination directories
pub fn prepare_output_dirs(layout: &ProjectLayout) -> Result<()> {
    ensure_dir(&layout.bundle_dir)?;
    ensure_dir(&layout.assets_dir)?;
    Ok(())
}

fn remove_file_if_exists(path: &Path) -> Result<Option<u64>> {
    let size = match fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to stat {}", path.display()));
        }
    };

    match fs::remove_file(path) {
        Ok(()) => Ok(Some(size)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

fn remove_dir_if_exists(path: &Path) -> Result<Option<u64>> {
    if !path.is_dir() {
        return Ok(None);
    }

    let size = dir_size(path);
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(Some(size)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}
