//! APK lookup
//!
//! Two strategies are supported:
//!
//! - `fixed`: Gradle's default name for the variant,
//!   `<module>-<env>-<type>.apk`, in the variant's output directory
//! - `scan`: the first `*.apk` (by file name) in that directory, for projects
//!   that customise the output file name

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

use super::ProjectLayout;
use crate::error::{hints, BuildError};

/// Package archive extension
pub const APK_EXTENSION: &str = "apk";

/// How the produced APK is located
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactLookup {
    /// Predictable file name from environment and build type
    #[default]
    Fixed,
    /// First APK found in the output directory
    Scan,
}

impl fmt::Display for ArtifactLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactLookup::Fixed => write!(f, "fixed"),
            ArtifactLookup::Scan => write!(f, "scan"),
        }
    }
}

/// Locate the APK for the layout's variant
pub fn locate_artifact(lookup: ArtifactLookup, layout: &ProjectLayout) -> Result<PathBuf> {
    let found = match lookup {
        ArtifactLookup::Fixed => {
            let path = layout.apk_dir.join(&layout.default_apk_name);
            path.is_file().then_some(path)
        }
        ArtifactLookup::Scan => scan_for_apk(&layout.apk_dir)?,
    };

    found.ok_or_else(|| {
        BuildError::ArtifactNotFound {
            searched: layout.apk_dir.clone(),
            hint: hints::artifact_not_found().to_string(),
        }
        .into()
    })
}

/// First `*.apk` file in `dir` by name, or `None`
fn scan_for_apk(dir: &Path) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let dir_str = dir
        .to_str()
        .with_context(|| format!("Output directory is not valid UTF-8: {}", dir.display()))?;
    let pattern = format!("{}/*.{}", glob::Pattern::escape(dir_str), APK_EXTENSION);

    let mut apks: Vec<PathBuf> = glob::glob(&pattern)
        .context("Failed to glob APK files")?
        .filter_map(|p| p.ok())
        .filter(|p| p.is_file())
        .collect();
    apks.sort();

    Ok(apks.into_iter().next())
}
