//! Gradle task naming and invocation

use super::{capitalize, BuildRequest, ProjectLayout};
use crate::config::ProjectConfig;
use crate::exec::CommandSpec;

/// Gradle wrapper script name for the host platform
pub fn wrapper_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "gradlew.bat"
    } else {
        "gradlew"
    }
}

/// Task name for a request: prefix + Env + Type (`assembleUatRelease`)
pub fn task_name(prefix: &str, request: &BuildRequest) -> String {
    format!(
        "{}{}{}",
        prefix,
        capitalize(request.environment.as_str()),
        capitalize(request.build_type.as_str())
    )
}

/// Build the native build command.
///
/// The wrapper is addressed by absolute path and runs with the native project
/// as its working directory; the orchestrator's own directory never changes.
pub fn native_build_command(config: &ProjectConfig, layout: &ProjectLayout, task: &str) -> CommandSpec {
    let spec = match config.native.command {
        Some(ref command) => CommandSpec::from_command_line(command),
        None => CommandSpec::new(layout.native_root.join(wrapper_name()).to_string_lossy()),
    };

    spec.arg(task).current_dir(&layout.native_root)
}
