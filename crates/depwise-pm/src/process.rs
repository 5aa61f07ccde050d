//! External command execution.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Captured result of one external command.
///
/// A non-zero exit code is a normal outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; `-1` when the process was terminated by a signal
    pub exit_code: i32,
}

impl ProcessOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external commands on behalf of the adapters.
///
/// Implementations return `Err` only when the process cannot be spawned.
/// Output is buffered in full and no timeout is applied.
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<ProcessOutput>;
}

/// Default runner backed by `tokio::process`.
///
/// Sets `FORCE_COLOR=0` so tools emit plain text. On Windows the command is
/// run through `cmd /C` so `.cmd` shims (npm, yarn, pnpm) resolve.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(program: &str) -> tokio::process::Command {
        if cfg!(windows) {
            let mut cmd = tokio::process::Command::new("cmd");
            cmd.arg("/C").arg(program);
            cmd
        } else {
            tokio::process::Command::new(program)
        }
    }
}

#[async_trait::async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<ProcessOutput> {
        tracing::debug!(program, ?args, cwd = %cwd.display(), "Running command");

        let output = Self::command(program)
            .args(args)
            .current_dir(cwd)
            .env("FORCE_COLOR", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| Error::Spawn {
                command: program.to_string(),
                source,
            })?;

        let exit_code = output.status.code().unwrap_or(-1);
        tracing::debug!(program, exit_code, "Command finished");

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
        })
    }
}

/// One recorded invocation of a [`ScriptedRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    /// `program arg1 arg2 ...`
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A runner that replays canned output instead of spawning processes.
///
/// Responses are keyed by the full command line (`"npm ls --all --json"`).
/// Unscripted commands behave like a missing binary and fail to spawn.
/// Every call is recorded for later inspection.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: Mutex<HashMap<String, ProcessOutput>>,
    invocations: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the output for a command line.
    pub fn respond(self, command_line: impl Into<String>, output: ProcessOutput) -> Self {
        self.responses.lock().insert(command_line.into(), output);
        self
    }

    /// Every invocation so far, in call order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }

    /// Command lines of every invocation so far.
    pub fn command_lines(&self) -> Vec<String> {
        self.invocations
            .lock()
            .iter()
            .map(Invocation::command_line)
            .collect()
    }
}

#[async_trait::async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<ProcessOutput> {
        let invocation = Invocation {
            program: program.to_string(),
            args: args.to_vec(),
            cwd: cwd.to_path_buf(),
        };
        let command_line = invocation.command_line();
        self.invocations.lock().push(invocation);

        self.responses
            .lock()
            .get(&command_line)
            .cloned()
            .ok_or_else(|| Error::Spawn {
                command: program.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no scripted response for `{command_line}`"),
                ),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_scripted_runner_replays_and_records() {
        let runner = ScriptedRunner::new().respond("npm outdated --json", ProcessOutput::ok("{}"));

        let output = runner
            .run("npm", &args(&["outdated", "--json"]), Path::new("/app"))
            .await
            .unwrap();
        assert_eq!(output.stdout, "{}");

        let missing = runner.run("yarn", &args(&["list"]), Path::new("/app")).await;
        assert!(matches!(missing, Err(Error::Spawn { .. })));

        assert_eq!(
            runner.command_lines(),
            vec!["npm outdated --json", "yarn list"]
        );
        assert_eq!(runner.invocations()[0].cwd, PathBuf::from("/app"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tokio_runner_reports_nonzero_exit() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = TokioCommandRunner::new()
            .run("sh", &args(&["-c", "echo out; echo err >&2; exit 3"]), dir.path())
            .await
            .unwrap();

        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert_eq!(output.exit_code, 3);
        assert!(!output.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tokio_runner_sets_force_color() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = TokioCommandRunner::new()
            .run("sh", &args(&["-c", "printf %s \"$FORCE_COLOR\""]), dir.path())
            .await
            .unwrap();
        assert_eq!(output.stdout, "0");
    }

    #[tokio::test]
    async fn test_tokio_runner_spawn_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = TokioCommandRunner::new()
            .run("depwise-no-such-binary-xyz", &[], dir.path())
            .await;
        if cfg!(windows) {
            // `cmd /C` itself spawns; the missing program becomes a non-zero exit
            assert!(!result.unwrap().success());
        } else {
            assert!(matches!(result, Err(Error::Spawn { .. })));
        }
    }
}
