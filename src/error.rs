//! Error types and helpers for user-friendly error messages
//!
//! Every variant is terminal for the process. The variants name the step that
//! failed so the operator can tell a bundler failure from a Gradle failure at
//! a glance, and most carry an actionable hint.

use std::path::PathBuf;

use thiserror::Error;

/// Build orchestration errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Malformed command-line input
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The `.env.<environment>` file does not exist
    #[error("Missing environment file: {}", path.display())]
    MissingConfig { path: PathBuf, hint: String },

    /// `redone.toml` could not be read or failed validation
    #[error("Invalid project configuration: {message}")]
    InvalidProjectConfig { message: String, hint: Option<String> },

    /// The JavaScript bundler exited non-zero
    #[error("JavaScript bundle failed for {environment}: {message}")]
    BundleFailed {
        environment: String,
        message: String,
        diagnostics: Vec<String>,
    },

    /// The Gradle task exited non-zero
    #[error("Native build task {task} failed: {message}")]
    NativeBuildFailed {
        task: String,
        message: String,
        diagnostics: Vec<String>,
    },

    /// No APK was found after a successful native build
    #[error("No APK found in {}", searched.display())]
    ArtifactNotFound { searched: PathBuf, hint: String },

    /// Copying the APK into the deploy directory failed
    #[error("Failed to copy {} to {}: {message}", artifact.display(), destination.display())]
    DeployCopyFailed {
        artifact: PathBuf,
        destination: PathBuf,
        message: String,
    },

    /// The device installer exited non-zero
    #[error("Install of {} failed: {message}", artifact.display())]
    InstallFailed {
        artifact: PathBuf,
        message: String,
        diagnostics: Vec<String>,
    },

    /// A delegated tool could not be spawned
    #[error("Missing tool: {tool}")]
    MissingTool {
        tool: String,
        required_for: String,
        hint: String,
    },
}

impl BuildError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a missing environment file error
    pub fn missing_config(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".env".to_string());
        Self::MissingConfig {
            hint: hints::env_file_not_found(&name),
            path,
        }
    }

    /// Create a project configuration error
    pub fn project_config(message: impl Into<String>) -> Self {
        Self::InvalidProjectConfig {
            message: message.into(),
            hint: Some(hints::invalid_redone_toml().to_string()),
        }
    }

    /// Create a missing tool error
    pub fn missing_tool(
        tool: impl Into<String>,
        required_for: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::MissingTool {
            tool: tool.into(),
            required_for: required_for.into(),
            hint: hint.into(),
        }
    }

    /// Short name of the failing step, used in the error banner
    pub fn step(&self) -> &'static str {
        match self {
            BuildError::InvalidArgument { .. } => "arguments",
            BuildError::MissingConfig { .. } => "load environment",
            BuildError::InvalidProjectConfig { .. } => "load project config",
            BuildError::BundleFailed { .. } => "bundle",
            BuildError::NativeBuildFailed { .. } => "native build",
            BuildError::ArtifactNotFound { .. } => "locate artifact",
            BuildError::DeployCopyFailed { .. } => "deploy",
            BuildError::InstallFailed { .. } => "install",
            BuildError::MissingTool { .. } => "spawn tool",
        }
    }

    fn hint(&self) -> Option<&str> {
        match self {
            BuildError::MissingConfig { hint, .. }
            | BuildError::ArtifactNotFound { hint, .. }
            | BuildError::MissingTool { hint, .. } => Some(hint.as_str()),
            BuildError::InvalidProjectConfig { hint, .. } => hint.as_deref(),
            BuildError::InstallFailed { .. } => Some(hints::adb_device()),
            _ => None,
        }
    }

    fn diagnostics(&self) -> &[String] {
        match self {
            BuildError::BundleFailed { diagnostics, .. }
            | BuildError::NativeBuildFailed { diagnostics, .. }
            | BuildError::InstallFailed { diagnostics, .. } => diagnostics.as_slice(),
            _ => &[],
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!(
            "\n{} [{}] {}",
            style("ERROR:").red().bold(),
            self.step(),
            self
        );

        if let BuildError::MissingTool { required_for, .. } = self {
            eprintln!("  (required for {})", required_for);
        }

        if let Some(h) = self.hint() {
            eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
        }

        let diagnostics = self.diagnostics();
        if !diagnostics.is_empty() {
            eprintln!("\n{}", style("DIAGNOSTICS:").cyan().bold());
            for diag in diagnostics {
                eprintln!("  • {}", diag);
            }
        }

        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    /// Get hint for a missing `.env.<environment>` file
    pub fn env_file_not_found(file_name: &str) -> String {
        format!(
            "Create {} in the project root with one KEY=value per line, e.g.:\n\
             APP_ID=com.example.redone\n\
             API_URL=https://api.example.com\n\
             \n\
             Use --root to point at a different project directory.",
            file_name
        )
    }

    /// Get hint for invalid redone.toml
    pub fn invalid_redone_toml() -> &'static str {
        "redone.toml is invalid. Common issues:\n\
         • Empty command array in [bundler], [native] or [install]\n\
         • Unknown [artifact] lookup (expected \"fixed\" or \"scan\")\n\
         • Product or module name containing path separators"
    }

    /// Get hint for an APK that Gradle did not produce where expected
    pub fn artifact_not_found() -> &'static str {
        "Gradle reported success but no APK was found. Try:\n\
         • Check the product flavor and build type names in android/app/build.gradle\n\
         • Use --lookup scan if the APK file name is customised\n\
         • Run with --verbose to see the Gradle output"
    }

    /// Get hint for a failed adb install
    pub fn adb_device() -> &'static str {
        "Check that a device or emulator is attached:\n\
         • Run: adb devices\n\
         • Enable USB debugging on the device\n\
         • Use --no-install to only build the APK"
    }

    /// Get hint for missing Node.js tooling
    pub fn node() -> &'static str {
        "Install Node.js from https://nodejs.org/ and run `npm install` in the\n\
         project root so the React Native CLI is available through npx."
    }

    /// Get hint for missing Gradle wrapper
    pub fn gradle() -> &'static str {
        "The Gradle wrapper was not found in the native project directory.\n\
         • Check [project].native_dir in redone.toml\n\
         • Regenerate it with: gradle wrapper"
    }

    /// Get hint for missing adb
    pub fn adb() -> &'static str {
        "Install the Android SDK platform-tools and add them to PATH:\n\
         • macOS: brew install --cask android-platform-tools\n\
         • Ubuntu: sudo apt install adb\n\
         • Or use --no-install to only build the APK"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_names_file() {
        let err = BuildError::missing_config("/work/app/.env.uat");
        assert_eq!(err.to_string(), "Missing environment file: /work/app/.env.uat");
        assert!(err.hint().unwrap().contains(".env.uat"));
        assert_eq!(err.step(), "load environment");
    }

    #[test]
    fn test_diagnostics_only_for_subprocess_failures() {
        let err = BuildError::NativeBuildFailed {
            task: "assembleDevDebug".to_string(),
            message: "exit code 1".to_string(),
            diagnostics: vec!["FAILURE: Build failed".to_string()],
        };
        assert_eq!(err.diagnostics().len(), 1);
        assert!(err.to_string().contains("assembleDevDebug"));

        let err = BuildError::invalid_argument("bad");
        assert!(err.diagnostics().is_empty());
        assert!(err.hint().is_none());
    }
}
