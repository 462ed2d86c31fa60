//! Build orchestration module
//!
//! ## Architecture
//!
//! ```text
//! CLI → orchestrator.rs → clean / bundle / gradle / artifact / deploy → npx, gradlew, adb
//! ```
//!
//! ## Modules
//!
//! - `clean` - Stale bundle and build output removal
//! - `bundle` - React Native bundler invocation
//! - `gradle` - Native task naming and Gradle wrapper invocation
//! - `artifact` - APK lookup strategies
//! - `deploy` - CI copy or device install
//! - `orchestrator` - The ordered step sequence

pub mod artifact;
pub mod bundle;
pub mod clean;
pub mod deploy;
pub mod gradle;
pub mod orchestrator;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::config::ProjectConfig;
use crate::error::BuildError;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Uat,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Environment::Dev, Environment::Uat, Environment::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Uat => "uat",
            Environment::Prod => "prod",
        }
    }

    /// Name of the env file for this environment (`.env.uat`)
    pub fn env_file_name(&self) -> String {
        format!(".env.{}", self.as_str())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = BuildError;

    // Environment names are matched exactly; `UAT` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Environment::ALL
            .into_iter()
            .find(|env| env.as_str() == s)
            .ok_or_else(|| {
                BuildError::invalid_argument(format!(
                    "unknown environment '{}' (expected one of: dev, uat, prod)",
                    s
                ))
            })
    }
}

/// Gradle build type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    #[default]
    Release,
    Debug,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Release => "release",
            BuildType::Debug => "debug",
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, BuildType::Debug)
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "release" => Ok(BuildType::Release),
            "debug" => Ok(BuildType::Debug),
            _ => Err(BuildError::invalid_argument(format!(
                "unknown build type '{}' (expected release or debug)",
                s
            ))),
        }
    }
}

/// A validated build request. Immutable for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildRequest {
    pub environment: Environment,
    pub build_type: BuildType,
}

impl BuildRequest {
    pub fn new(environment: Environment, build_type: Option<BuildType>) -> Self {
        Self {
            environment,
            build_type: build_type.unwrap_or_default(),
        }
    }
}

/// Uppercase the first character (`uat` → `Uat`)
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Filesystem locations for one build request
///
/// Bundle and asset directories live in the per-environment source set so the
/// matching product flavor picks them up. Gradle owns everything under
/// `build/`.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Project root (where `.env.*` and `redone.toml` live)
    pub root: PathBuf,
    /// `.env.<environment>`
    pub env_file: PathBuf,
    /// Gradle project root (android/)
    pub native_root: PathBuf,
    /// `android/app/src/<env>/assets`
    pub bundle_dir: PathBuf,
    /// `android/app/src/<env>/assets/index.android.bundle`
    pub bundle_file: PathBuf,
    /// `android/app/src/<env>/res`
    pub assets_dir: PathBuf,
    /// `android/app/build`
    pub build_output_dir: PathBuf,
    /// `android/app/build/outputs/apk/<env>/<type>`
    pub apk_dir: PathBuf,
    /// Gradle's default APK name for this variant (`app-uat-release.apk`)
    pub default_apk_name: String,
}

impl ProjectLayout {
    pub const BUNDLE_FILE_NAME: &'static str = "index.android.bundle";

    pub fn new(root: &Path, config: &ProjectConfig, request: &BuildRequest) -> Self {
        let env = request.environment.as_str();
        let build_type = request.build_type.as_str();

        let native_root = root.join(&config.project.native_dir);
        let module_dir = native_root.join(&config.project.app_module);
        let source_set = module_dir.join("src").join(env);
        let bundle_dir = source_set.join("assets");
        let build_output_dir = module_dir.join("build");

        Self {
            root: root.to_path_buf(),
            env_file: root.join(request.environment.env_file_name()),
            bundle_file: bundle_dir.join(Self::BUNDLE_FILE_NAME),
            bundle_dir,
            assets_dir: source_set.join("res"),
            apk_dir: build_output_dir
                .join("outputs")
                .join("apk")
                .join(env)
                .join(build_type),
            build_output_dir,
            default_apk_name: format!("{}-{}-{}.apk", config.project.app_module, env, build_type),
            native_root,
        }
    }
}
