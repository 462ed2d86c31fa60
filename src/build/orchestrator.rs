//! Build orchestration
//!
//! Runs the build steps strictly in order and stops at the first failure:
//!
//! 1. load `.env.<environment>`
//! 2. remove the previous bundle and Gradle output
//! 3. create the bundle and asset directories
//! 4. run the JavaScript bundler
//! 5. run the Gradle task
//! 6. locate the APK
//! 7. copy it to the deploy directory, install it, or just report it
//!
//! Loading and parsing the env file share step 1, and the final summary is
//! printed by the CLI after `run` returns. Steps 2 to 7 here correspond to
//! steps 3 to 8 of the documented build sequence.
//!
//! Nothing is retried. Two builds against the same project directory at the
//! same time will race on the output tree; that is not guarded against.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use super::artifact::{locate_artifact, ArtifactLookup};
use super::bundle::bundle_command;
use super::clean::{clean_previous_build, prepare_output_dirs};
use super::deploy::{canonical_name, copy_to_deploy_dir, install_command, DeployOutcome};
use super::gradle::{native_build_command, task_name};
use super::{BuildRequest, BuildType, Environment, ProjectLayout};
use crate::config::{EnvConfig, ProjectConfig};
use crate::error::{hints, BuildError};
use crate::exec::{CommandResult, CommandRunner, CommandSpec, ProgramNotFound};
use crate::utils::terminal::{print_info, print_step, print_warning};

const TOTAL_STEPS: usize = 7;

/// Variable telling the native config plugin which env file to read
pub const ENVFILE_VAR: &str = "ENVFILE";

/// Options resolved from redone.toml and the command line
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Install on a device when no deploy directory is set
    pub install_locally: bool,
    pub lookup: ArtifactLookup,
    /// CI deploy directory; when set the APK is copied here
    pub deploy_dir: Option<PathBuf>,
    /// Copy as `<product>-<env>-<type>.apk`
    pub rename_on_deploy: bool,
    pub verbose: bool,
}

impl BuildOptions {
    /// Options as configured in redone.toml, before command-line overrides
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            install_locally: config.install.enabled,
            lookup: config.artifact.lookup,
            deploy_dir: None,
            rename_on_deploy: config.artifact.rename_on_deploy,
            verbose: false,
        }
    }
}

/// Summary of a successful build
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub environment: Environment,
    pub build_type: BuildType,
    pub task: String,
    pub artifact: PathBuf,
    pub outcome: DeployOutcome,
}

/// Drives one build request through every step
pub struct Orchestrator<R> {
    root: PathBuf,
    config: ProjectConfig,
    options: BuildOptions,
    runner: R,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(root: PathBuf, config: ProjectConfig, options: BuildOptions, runner: R) -> Self {
        Self {
            root,
            config,
            options,
            runner,
        }
    }

    /// Run the build. Any error aborts the remaining steps.
    pub fn run(&self, request: BuildRequest) -> Result<BuildReport> {
        let layout = ProjectLayout::new(&self.root, &self.config, &request);

        print_step(1, TOTAL_STEPS, &format!("Loading {}", request.environment.env_file_name()));
        let env = EnvConfig::load(&layout.env_file)?;
        if env.is_empty() {
            print_warning(&format!("{} has no entries", layout.env_file.display()));
        } else if self.options.verbose {
            eprintln!("  Loaded {} variable(s) from {}", env.len(), env.path().display());
            if let Some(app_id) = env.get("APP_ID") {
                eprintln!("  Application id: {}", app_id);
            }
        }

        print_step(2, TOTAL_STEPS, "Removing previous bundle and build output");
        clean_previous_build(&layout, self.options.verbose)?;

        print_step(3, TOTAL_STEPS, "Preparing bundle and asset directories");
        prepare_output_dirs(&layout)?;

        print_step(
            4,
            TOTAL_STEPS,
            &format!("Bundling JavaScript ({} {})", request.environment, request.build_type),
        );
        let bundle = self.with_env(bundle_command(&self.config, &layout, &request), &env, &request);
        let result = self.run_tool(&bundle, "JavaScript bundling", hints::node())?;
        if !result.success {
            return Err(BuildError::BundleFailed {
                environment: request.environment.to_string(),
                message: result.failure_message(),
                diagnostics: result.diagnostics(),
            }
            .into());
        }

        let task = task_name(&self.config.native.task_prefix, &request);
        print_step(5, TOTAL_STEPS, &format!("Running Gradle {}", task));
        let native = self.with_env(native_build_command(&self.config, &layout, &task), &env, &request);
        let result = self.run_tool(&native, "the native build", hints::gradle())?;
        if !result.success {
            return Err(BuildError::NativeBuildFailed {
                task,
                message: result.failure_message(),
                diagnostics: result.diagnostics(),
            }
            .into());
        }

        print_step(6, TOTAL_STEPS, &format!("Locating APK ({} lookup)", self.options.lookup));
        let artifact = locate_artifact(self.options.lookup, &layout)?;

        let outcome = self.deliver(&artifact, &request, &env)?;

        Ok(BuildReport {
            environment: request.environment,
            build_type: request.build_type,
            task,
            artifact,
            outcome,
        })
    }

    fn deliver(&self, artifact: &Path, request: &BuildRequest, env: &EnvConfig) -> Result<DeployOutcome> {
        if let Some(ref deploy_dir) = self.options.deploy_dir {
            print_step(7, TOTAL_STEPS, &format!("Copying APK to {}", deploy_dir.display()));
            let rename = self
                .options
                .rename_on_deploy
                .then(|| canonical_name(&self.config.project.product, request));
            let destination = copy_to_deploy_dir(artifact, deploy_dir, rename.as_deref())?;
            return Ok(DeployOutcome::Deployed(destination));
        }

        if !self.options.install_locally {
            print_step(7, TOTAL_STEPS, "Skipping device install");
            print_info(&format!("APK available at {}", artifact.display()));
            return Ok(DeployOutcome::Located);
        }

        print_step(7, TOTAL_STEPS, "Installing APK on device");
        let install = self.with_env(install_command(&self.config, artifact), env, request);
        let result = self.run_tool(&install, "device installation", hints::adb())?;
        if !result.success {
            return Err(BuildError::InstallFailed {
                artifact: artifact.to_path_buf(),
                message: result.failure_message(),
                diagnostics: result.diagnostics(),
            }
            .into());
        }

        Ok(DeployOutcome::Installed)
    }

    /// Attach the loaded env file entries to a subprocess
    fn with_env(&self, spec: CommandSpec, env: &EnvConfig, request: &BuildRequest) -> CommandSpec {
        spec.envs(env.iter())
            .env(ENVFILE_VAR, request.environment.env_file_name())
    }

    /// Run a tool, turning a missing program into a `MissingTool` error
    fn run_tool(&self, spec: &CommandSpec, required_for: &str, hint: &str) -> Result<CommandResult> {
        match self.runner.run(spec) {
            Ok(result) => Ok(result),
            Err(e) if e.downcast_ref::<ProgramNotFound>().is_some() => {
                Err(BuildError::missing_tool(spec.program.as_str(), required_for, hint).into())
            }
            Err(e) => Err(e),
        }
    }
}
