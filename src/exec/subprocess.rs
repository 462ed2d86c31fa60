//! Subprocess execution
//!
//! Every external tool (bundler, Gradle, adb) goes through [`CommandRunner`],
//! so the orchestrator can be driven by a fake in tests.

use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::utils::terminal;

/// Number of stderr lines kept for error diagnostics
const DIAGNOSTIC_TAIL_LINES: usize = 15;

/// A fully described subprocess invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory for the child only
    pub cwd: Option<PathBuf>,
    /// Extra environment variables for the child
    pub envs: BTreeMap<String, String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: BTreeMap::new(),
        }
    }

    /// Split a configured command (`["npx", "react-native", "bundle"]`)
    pub fn from_command_line(command: &[String]) -> Self {
        let mut spec = Self::new(command.first().cloned().unwrap_or_default());
        spec.args.extend(command.iter().skip(1).cloned());
        spec
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.insert(key.into(), value.into());
        self
    }

    pub fn envs<'a, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.envs
            .extend(vars.into_iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Result of a subprocess execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,

    /// Process exit code (-1 when terminated by a signal)
    pub exit_code: i32,

    /// Captured standard output (empty when output was inherited)
    pub stdout: String,

    /// Captured standard error (empty when output was inherited)
    pub stderr: String,

    /// Execution duration
    pub duration: Duration,
}

impl CommandResult {
    /// Create a CommandResult from an exit status
    pub fn from_status(status: ExitStatus, stdout: String, stderr: String, duration: Duration) -> Self {
        let exit_code = status.code().unwrap_or(-1);
        Self {
            success: status.success(),
            exit_code,
            stdout,
            stderr,
            duration,
        }
    }

    /// Last lines of stderr (falling back to stdout) for error reports
    pub fn diagnostics(&self) -> Vec<String> {
        let source = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        let lines: Vec<&str> = source.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(DIAGNOSTIC_TAIL_LINES);
        lines[start..].iter().map(|l| l.to_string()).collect()
    }

    /// Human-readable failure summary
    pub fn failure_message(&self) -> String {
        if self.exit_code == -1 {
            "terminated by signal".to_string()
        } else {
            format!("exit code {}", self.exit_code)
        }
    }
}

/// Error raised when the program itself cannot be started
#[derive(Debug, thiserror::Error)]
#[error("program not found: {program}")]
pub struct ProgramNotFound {
    pub program: String,
}

/// Runs a subprocess to completion
pub trait CommandRunner {
    /// Run the command and wait for it. A non-zero exit is returned as a
    /// `CommandResult`, not an error; `Err` means the process never ran.
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult>;
}

/// Runs commands on the host
pub struct SystemRunner {
    verbose: bool,
}

impl SystemRunner {
    /// In verbose mode child output is inherited, otherwise it is captured
    /// behind a spinner.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        let start = Instant::now();

        let mut cmd = Command::new(resolve_program(&spec.program));
        cmd.args(&spec.args);
        cmd.envs(&spec.envs);
        if let Some(ref dir) = spec.cwd {
            cmd.current_dir(dir);
        }

        if self.verbose {
            eprintln!("Executing: {}", spec);
            if let Some(ref dir) = spec.cwd {
                eprintln!("  in {}", dir.display());
            }

            cmd.stdin(Stdio::inherit());
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());

            let status = cmd.status().map_err(|e| spawn_error(spec, e))?;
            let result =
                CommandResult::from_status(status, String::new(), String::new(), start.elapsed());
            eprintln!(
                "  {} finished in {:.1}s ({})",
                spec.program,
                result.duration.as_secs_f64(),
                result.failure_message()
            );

            return Ok(result);
        }

        let spinner = terminal::create_spinner(&format!("Running {}", spec.program));
        let output = cmd.output();
        spinner.finish_and_clear();

        let output = output.map_err(|e| spawn_error(spec, e))?;

        Ok(CommandResult::from_status(
            output.status,
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
            start.elapsed(),
        ))
    }
}

fn spawn_error(spec: &CommandSpec, err: std::io::Error) -> anyhow::Error {
    let err = if err.kind() == ErrorKind::NotFound {
        anyhow::Error::new(ProgramNotFound {
            program: spec.program.clone(),
        })
    } else {
        anyhow::Error::new(err)
    };
    err.context(format!("Failed to execute {}", spec.program))
}

/// Resolve a program through PATH (handles `npx.cmd` on Windows), falling
/// back to the name as given
fn resolve_program(program: &str) -> PathBuf {
    which::which(program).unwrap_or_else(|_| PathBuf::from(program))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(exit_code: i32, stdout: &str, stderr: &str) -> CommandResult {
        CommandResult {
            success: exit_code == 0,
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_spec_builder_and_display() {
        let spec = CommandSpec::from_command_line(&["adb".to_string(), "install".to_string()])
            .arg("-r")
            .arg("app.apk")
            .current_dir("/work")
            .env("ENVFILE", ".env.dev");

        assert_eq!(spec.program, "adb");
        assert_eq!(spec.args, vec!["install", "-r", "app.apk"]);
        assert_eq!(spec.cwd, Some(PathBuf::from("/work")));
        assert_eq!(spec.envs.get("ENVFILE").map(String::as_str), Some(".env.dev"));
        assert_eq!(spec.to_string(), "adb install -r app.apk");
    }

    #[test]
    fn test_diagnostics_prefers_stderr_tail() {
        let stderr: String = (1..=20).map(|i| format!("line {}\n", i)).collect();
        let diags = result(1, "ignored", &stderr).diagnostics();
        assert_eq!(diags.len(), DIAGNOSTIC_TAIL_LINES);
        assert_eq!(diags.first().map(String::as_str), Some("line 6"));
        assert_eq!(diags.last().map(String::as_str), Some("line 20"));

        let diags = result(1, "only stdout\n", "  \n").diagnostics();
        assert_eq!(diags, vec!["only stdout"]);
    }

    #[test]
    fn test_failure_message() {
        assert_eq!(result(2, "", "").failure_message(), "exit code 2");
        assert_eq!(result(-1, "", "").failure_message(), "terminated by signal");
    }

    #[cfg(unix)]
    #[test]
    fn test_verbose_run_reports_exit_code() {
        let runner = SystemRunner::new(true);
        let result = runner
            .run(&CommandSpec::new("sh").args(["-c", "exit 3"]))
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, 3);
        assert_eq!(result.failure_message(), "exit code 3");
        assert!(result.stderr.is_empty());
    }

    #[test]
    fn test_missing_program_is_program_not_found() {
        let runner = SystemRunner::new(true);
        let err = runner
            .run(&CommandSpec::new("redone-build-no-such-program"))
            .unwrap_err();
        assert!(err.downcast_ref::<ProgramNotFound>().is_some());
        assert!(err.to_string().contains("redone-build-no-such-program"));
    }
}
