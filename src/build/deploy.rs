//! Artifact delivery: copy to a CI deploy directory or install on a device

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::BuildRequest;
use crate::config::ProjectConfig;
use crate::error::BuildError;
use crate::exec::CommandSpec;

/// What happened to the artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum DeployOutcome {
    /// Copied into the CI deploy directory
    Deployed(PathBuf),
    /// Installed on an attached device
    Installed,
    /// Left in place; location reported only
    Located,
}

/// Canonical APK name (`redone-uat-release.apk`)
pub fn canonical_name(product: &str, request: &BuildRequest) -> String {
    format!(
        "{}-{}-{}.apk",
        product, request.environment, request.build_type
    )
}

/// Copy the artifact into `deploy_dir`, creating it if needed.
///
/// The copy keeps the artifact's file name unless `rename_to` is given.
pub fn copy_to_deploy_dir(
    artifact: &Path,
    deploy_dir: &Path,
    rename_to: Option<&str>,
) -> Result<PathBuf, BuildError> {
    let file_name: OsString = match rename_to {
        Some(name) => name.into(),
        None => artifact
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| copy_failed(artifact, deploy_dir, "artifact has no file name".to_string()))?,
    };
    let destination = deploy_dir.join(file_name);

    fs::create_dir_all(deploy_dir)
        .map_err(|e| copy_failed(artifact, &destination, e.to_string()))?;
    fs::copy(artifact, &destination)
        .map_err(|e| copy_failed(artifact, &destination, e.to_string()))?;

    Ok(destination)
}

fn copy_failed(artifact: &Path, destination: &Path, message: String) -> BuildError {
    BuildError::DeployCopyFailed {
        artifact: artifact.to_path_buf(),
        destination: destination.to_path_buf(),
        message,
    }
}

/// Build the device install command; the APK path is the last argument
pub fn install_command(config: &ProjectConfig, artifact: &Path) -> CommandSpec {
    CommandSpec::from_command_line(&config.install.command).arg(artifact.to_string_lossy())
}
