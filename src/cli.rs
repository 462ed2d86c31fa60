//! CLI argument parsing using clap derive macros

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use crate::build::artifact::ArtifactLookup;
use crate::build::deploy::DeployOutcome;
use crate::build::orchestrator::{BuildOptions, BuildReport, Orchestrator};
use crate::build::{BuildRequest, BuildType, Environment};
use crate::config::ProjectConfig;
use crate::exec::SystemRunner;
use crate::utils::paths::resolve_project_root;
use crate::utils::terminal::print_success;

/// Redone build - bundle, build and ship the Android app for one environment
///
/// Loads `.env.<ENVIRONMENT>`, bundles the JavaScript, runs the matching
/// Gradle assemble task and then either copies the APK to the CI deploy
/// directory or installs it on an attached device.
#[derive(Parser, Debug)]
#[command(name = "redone-build")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Deployment environment: dev, uat or prod
    #[arg(value_name = "ENVIRONMENT")]
    pub environment: Environment,

    /// Build type: release or debug (case-insensitive) [default: release]
    #[arg(value_name = "BUILD_TYPE")]
    pub build_type: Option<BuildType>,

    /// Project root containing the .env files [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Copy the APK into this directory instead of installing it
    #[arg(long, env = "CI_DEPLOY_DIR", value_name = "DIR")]
    pub deploy_dir: Option<PathBuf>,

    /// Do not install on a device; only report where the APK is
    #[arg(long)]
    pub no_install: bool,

    /// How to find the APK after the Gradle build
    #[arg(long, value_enum)]
    pub lookup: Option<ArtifactLookup>,

    /// Print the build report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Execute the build
    pub fn execute(self) -> Result<()> {
        // Set up terminal colors
        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        let start = Instant::now();
        let root = resolve_project_root(self.root.as_deref())?;
        let config = ProjectConfig::load(&root)?;

        let options = self.build_options(&config);
        let request = BuildRequest::new(self.environment, self.build_type);

        if self.verbose {
            eprintln!(
                "Building {} {} in {}",
                request.environment,
                request.build_type,
                root.display()
            );
        }

        let orchestrator = Orchestrator::new(root, config, options, SystemRunner::new(self.verbose));
        let report = orchestrator.run(request)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Self::print_report(&report, start.elapsed().as_secs_f64());

        Ok(())
    }

    /// Apply command-line overrides on top of redone.toml
    fn build_options(&self, config: &ProjectConfig) -> BuildOptions {
        let mut options = BuildOptions::from_config(config);
        options.verbose = self.verbose;
        options.deploy_dir = self
            .deploy_dir
            .clone()
            .filter(|dir| !dir.as_os_str().is_empty());
        if self.no_install {
            options.install_locally = false;
        }
        if let Some(lookup) = self.lookup {
            options.lookup = lookup;
        }
        options
    }

    fn print_report(report: &BuildReport, duration_secs: f64) {
        print_success(&format!(
            "{} {} built in {:.2}s",
            report.environment, report.build_type, duration_secs
        ));
        eprintln!("  APK: {}", report.artifact.display());
        match &report.outcome {
            DeployOutcome::Deployed(path) => eprintln!("  Deployed: {}", path.display()),
            DeployOutcome::Installed => eprintln!("  Installed on device"),
            DeployOutcome::Located => {}
        }
    }
}
