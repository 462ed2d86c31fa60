//! redone.toml configuration parsing
//!
//! The file is optional. Every key has a default matching a stock React
//! Native project, so most projects only set what differs:
//!
//! ```toml
//! [project]
//! product = "redone"
//! native_dir = "android"
//!
//! [artifact]
//! lookup = "scan"
//! rename_on_deploy = true
//!
//! [install]
//! enabled = false
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::build::artifact::ArtifactLookup;
use crate::error::BuildError;

pub const CONFIG_FILE_NAME: &str = "redone.toml";

/// Root configuration from redone.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub project: ProjectSection,
    pub bundler: BundlerSection,
    pub native: NativeSection,
    pub artifact: ArtifactSection,
    pub install: InstallSection,
}

/// Project metadata and layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectSection {
    /// Product name used for canonical APK names (`redone-uat-release.apk`)
    pub product: String,
    /// Gradle project directory, relative to the root
    pub native_dir: String,
    /// Gradle application module inside `native_dir`
    pub app_module: String,
    /// JavaScript entry module
    pub entry_file: String,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            product: "redone".to_string(),
            native_dir: "android".to_string(),
            app_module: "app".to_string(),
            entry_file: "index.js".to_string(),
        }
    }
}

/// JavaScript bundler command
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundlerSection {
    /// Program and leading arguments; bundle options are appended
    pub command: Vec<String>,
}

impl Default for BundlerSection {
    fn default() -> Self {
        Self {
            command: vec![
                "npx".to_string(),
                "react-native".to_string(),
                "bundle".to_string(),
            ],
        }
    }
}

/// Native build tool
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NativeSection {
    /// Overrides the Gradle wrapper; the task name is appended
    pub command: Option<Vec<String>>,
    /// Task prefix combined with the environment and build type
    pub task_prefix: String,
}

impl Default for NativeSection {
    fn default() -> Self {
        Self {
            command: None,
            task_prefix: "assemble".to_string(),
        }
    }
}

/// Artifact lookup and deploy naming
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactSection {
    pub lookup: ArtifactLookup,
    /// Copy as `<product>-<env>-<type>.apk` instead of keeping Gradle's name
    pub rename_on_deploy: bool,
}

/// Device installation
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallSection {
    /// Install to an attached device when no deploy directory is set
    pub enabled: bool,
    /// Installer program and leading arguments; the APK path is appended
    pub command: Vec<String>,
}

impl Default for InstallSection {
    fn default() -> Self {
        Self {
            enabled: true,
            command: vec!["adb".to_string(), "install".to_string(), "-r".to_string()],
        }
    }
}

impl ProjectConfig {
    /// Load `redone.toml` from the project root, or defaults if it is absent
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| BuildError::project_config(format!("{}: {}", CONFIG_FILE_NAME, e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), BuildError> {
        validate_name("project.product", &self.project.product)?;
        validate_name("project.native_dir", &self.project.native_dir)?;
        validate_name("project.app_module", &self.project.app_module)?;

        if self.project.entry_file.trim().is_empty() {
            return Err(BuildError::project_config("project.entry_file must not be empty"));
        }

        validate_command("bundler.command", &self.bundler.command)?;
        if let Some(ref command) = self.native.command {
            validate_command("native.command", command)?;
        }
        validate_command("install.command", &self.install.command)?;

        if self.native.task_prefix.is_empty() {
            return Err(BuildError::project_config("native.task_prefix must not be empty"));
        }

        Ok(())
    }
}

/// Names end up in paths and file names, so they must be a single component
fn validate_name(key: &str, value: &str) -> Result<(), BuildError> {
    if value.is_empty() {
        return Err(BuildError::project_config(format!("{} must not be empty", key)));
    }
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(BuildError::project_config(format!(
            "{} must be a single path component, got '{}'",
            key, value
        )));
    }
    Ok(())
}

fn validate_command(key: &str, command: &[String]) -> Result<(), BuildError> {
    match command.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(BuildError::project_config(format!(
            "{} must name a program",
            key
        ))),
    }
}
