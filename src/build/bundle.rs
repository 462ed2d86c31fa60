//! React Native bundler invocation
//!
//! Produces `index.android.bundle` and the bundled image/font resources for
//! one environment's source set.

use super::{BuildRequest, ProjectLayout};
use crate::config::ProjectConfig;
use crate::exec::CommandSpec;

/// Target platform passed to the bundler
pub const BUNDLE_PLATFORM: &str = "android";

/// Build the bundler command. Runs from the project root.
pub fn bundle_command(
    config: &ProjectConfig,
    layout: &ProjectLayout,
    request: &BuildRequest,
) -> CommandSpec {
    CommandSpec::from_command_line(&config.bundler.command)
        .args(["--platform", BUNDLE_PLATFORM])
        .arg("--dev")
        .arg(request.build_type.is_debug().to_string())
        .arg("--entry-file")
        .arg(config.project.entry_file.as_str())
        .arg("--bundle-output")
        .arg(layout.bundle_file.to_string_lossy())
        .arg("--assets-dest")
        .arg(layout.assets_dir.to_string_lossy())
        .current_dir(&layout.root)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::build::{BuildType, Environment};

    #[test]
    fn test_debug_build_sets_dev_flag() {
        let config = ProjectConfig::default();
        let request = BuildRequest::new(Environment::Uat, Some(BuildType::Debug));
        let layout = ProjectLayout::new(Path::new("/work"), &config, &request);

        let spec = bundle_command(&config, &layout, &request);
        assert_eq!(spec.program, "npx");
        assert_eq!(
            spec.args,
            vec![
                "react-native",
                "bundle",
                "--platform",
                "android",
                "--dev",
                "true",
                "--entry-file",
                "index.js",
                "--bundle-output",
                "/work/android/app/src/uat/assets/index.android.bundle",
                "--assets-dest",
                "/work/android/app/src/uat/res",
            ]
        );
        assert_eq!(spec.cwd.as_deref(), Some(Path::new("/work")));
    }

    #[test]
    fn test_release_build_clears_dev_flag() {
        let config = ProjectConfig::default();
        let request = BuildRequest::new(Environment::Prod, None);
        let layout = ProjectLayout::new(Path::new("/work"), &config, &request);

        let spec = bundle_command(&config, &layout, &request);
        let dev_idx = spec.args.iter().position(|a| a == "--dev").unwrap();
        assert_eq!(spec.args[dev_idx + 1], "false");
    }
}
