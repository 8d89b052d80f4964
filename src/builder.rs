//! Build orchestration: runs Hexo operations against the site root.
//!
//! The operator vocabulary is fixed: `clean`, `generate`, `deploy`, `server`.
//! Each maps to exactly one external command, `<build.command> <operation>`
//! (by default `hexo generate` etc.), run with the site root as working
//! directory. Any other operation name is rejected before a process is
//! spawned.
//!
//! ## Invocation lifecycle
//!
//! ```text
//! Idle ──start──▶ Running ──exit 0──────────────▶ Succeeded
//!                    └────non-zero / spawn error─▶ Failed
//! ```
//!
//! A successful run returns the tool's stdout. A failed run returns an
//! [`BuildError::ExternalProcess`] carrying the failure message plus captured
//! stdout and stderr, since the tool's own diagnostics are what an operator
//! needs to see.
//!
//! ## Process runner
//!
//! Spawning goes through the [`ProcessRunner`] trait so the allow-list and
//! lifecycle can be tested without a Hexo installation. The production
//! implementation is [`SystemRunner`].
//!
//! Invocations are not serialized against each other and have no timeout:
//! `server` in particular runs until the process exits.

use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Invalid build operation {0:?}; expected one of clean, generate, deploy, server")]
    InvalidOperation(String),
    #[error("`{command}` failed: {message}")]
    ExternalProcess {
        operation: BuildOperation,
        command: String,
        message: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

/// A named Hexo operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildOperation {
    Clean,
    Generate,
    Deploy,
    Server,
}

impl BuildOperation {
    pub const ALL: [BuildOperation; 4] = [Self::Clean, Self::Generate, Self::Deploy, Self::Server];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Generate => "generate",
            Self::Deploy => "deploy",
            Self::Server => "server",
        }
    }
}

impl FromStr for BuildOperation {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| BuildError::InvalidOperation(s.to_string()))
    }
}

impl fmt::Display for BuildOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Tracks one invocation through its lifecycle.
#[derive(Debug)]
pub struct BuildRun {
    operation: BuildOperation,
    state: BuildState,
}

impl BuildRun {
    pub fn new(operation: BuildOperation) -> Self {
        Self {
            operation,
            state: BuildState::Idle,
        }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// `Idle -> Running`. Returns false (and stays put) from any other state.
    pub fn start(&mut self) -> bool {
        self.advance(BuildState::Idle, BuildState::Running)
    }

    /// `Running -> Succeeded` or `Running -> Failed`.
    pub fn finish(&mut self, success: bool) -> bool {
        let next = if success {
            BuildState::Succeeded
        } else {
            BuildState::Failed
        };
        self.advance(BuildState::Running, next)
    }

    fn advance(&mut self, from: BuildState, to: BuildState) -> bool {
        if self.state != from {
            return false;
        }
        debug!(operation = %self.operation, from = ?from, to = ?to, "Build state change");
        self.state = to;
        true
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    /// Exit code, absent when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs an external program to completion.
pub trait ProcessRunner: Sync {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<ProcessOutput>;
}

/// Spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<ProcessOutput> {
        let output = Command::new(program).args(args).current_dir(cwd).output()?;
        Ok(ProcessOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Result of a successful build operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildOutput {
    pub operation: BuildOperation,
    pub state: BuildState,
    #[serde(rename = "output")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

/// Runs allow-listed operations through a [`ProcessRunner`].
#[derive(Debug)]
pub struct BuildOrchestrator<R = SystemRunner> {
    runner: R,
    root: PathBuf,
    command: Vec<String>,
}

impl<R: ProcessRunner> BuildOrchestrator<R> {
    /// `command` is the program followed by leading arguments, e.g. `["hexo"]`.
    pub fn new(runner: R, root: impl Into<PathBuf>, command: Vec<String>) -> Self {
        Self {
            runner,
            root: root.into(),
            command,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Validate `operation` against the allow-list and run it.
    pub fn run(&self, operation: &str) -> Result<BuildOutput, BuildError> {
        let operation: BuildOperation = operation.parse()?;
        self.execute(operation)
    }

    /// Run an already-validated operation.
    pub fn execute(&self, operation: BuildOperation) -> Result<BuildOutput, BuildError> {
        let mut run = BuildRun::new(operation);
        info!(
            operation = %operation,
            command = %self.display_command(operation),
            cwd = %self.root.display(),
            "Executing build operation"
        );

        let Some((program, leading)) = self.command.split_first() else {
            return Err(self.failure(
                operation,
                "no build command configured".to_string(),
                ProcessOutput::default(),
            ));
        };
        let mut args = leading.to_vec();
        args.push(operation.as_str().to_string());

        run.start();
        let started = Instant::now();
        let result = self.runner.run(program, &args, &self.root);
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(output) if output.success => {
                run.finish(true);
                debug!(operation = %operation, duration_ms, "Build operation completed");
                Ok(BuildOutput {
                    operation,
                    state: run.state(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                })
            }
            Ok(output) => {
                run.finish(false);
                let message = match output.exit_code {
                    Some(code) => format!("exited with status {code}"),
                    None => "terminated by signal".to_string(),
                };
                error!(
                    operation = %operation,
                    duration_ms,
                    stderr = %output.stderr,
                    "Build operation failed: {message}"
                );
                Err(self.failure(operation, message, output))
            }
            Err(err) => {
                run.finish(false);
                let message = format!("could not start {program}: {err}");
                error!(operation = %operation, "Build operation failed: {message}");
                Err(self.failure(operation, message, ProcessOutput::default()))
            }
        }
    }

    fn display_command(&self, operation: BuildOperation) -> String {
        let mut parts: Vec<&str> = self.command.iter().map(String::as_str).collect();
        parts.push(operation.as_str());
        parts.join(" ")
    }

    fn failure(&self, operation: BuildOperation, message: String, output: ProcessOutput) -> BuildError {
        BuildError::ExternalProcess {
            operation,
            command: self.display_command(operation),
            message,
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// One recorded call to [`MockRunner::run`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub program: String,
        pub args: Vec<String>,
        pub cwd: PathBuf,
    }

    /// Runner that records invocations and replays a canned result.
    /// Uses Mutex (not RefCell) so it satisfies the `Sync` bound.
    pub struct MockRunner {
        pub calls: Mutex<Vec<RecordedCall>>,
        result: Box<dyn Fn() -> io::Result<ProcessOutput> + Send + Sync>,
    }

    impl MockRunner {
        pub fn succeeding(stdout: &str) -> Self {
            let stdout = stdout.to_string();
            Self::with(move || {
                Ok(ProcessOutput {
                    success: true,
                    exit_code: Some(0),
                    stdout: stdout.clone(),
                    stderr: String::new(),
                })
            })
        }

        pub fn failing(code: i32, stderr: &str) -> Self {
            let stderr = stderr.to_string();
            Self::with(move || {
                Ok(ProcessOutput {
                    success: false,
                    exit_code: Some(code),
                    stdout: "partial output".to_string(),
                    stderr: stderr.clone(),
                })
            })
        }

        pub fn unspawnable() -> Self {
            Self::with(|| Err(io::Error::new(io::ErrorKind::NotFound, "No such file or directory")))
        }

        fn with(result: impl Fn() -> io::Result<ProcessOutput> + Send + Sync + 'static) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                result: Box::new(result),
            }
        }

        pub fn get_calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProcessRunner for MockRunner {
        fn run(&self, program: &str, args: &[String], cwd: &Path) -> io::Result<ProcessOutput> {
            self.calls.lock().unwrap().push(RecordedCall {
                program: program.to_string(),
                args: args.to_vec(),
                cwd: cwd.to_path_buf(),
            });
            (self.result)()
        }
    }

    fn orchestrator(runner: MockRunner) -> BuildOrchestrator<MockRunner> {
        BuildOrchestrator::new(runner, "/srv/blog", vec!["hexo".to_string()])
    }

    // =========================================================================
    // Allow-list
    // =========================================================================

    #[test]
    fn unknown_operation_rejected_without_spawning() {
        let builder = orchestrator(MockRunner::succeeding(""));
        let result = builder.run("publish");
        assert!(matches!(result, Err(BuildError::InvalidOperation(op)) if op == "publish"));
        assert!(builder.runner().get_calls().is_empty());
    }

    #[test]
    fn shell_metacharacters_rejected() {
        let builder = orchestrator(MockRunner::succeeding(""));
        assert!(builder.run("clean; rm -rf /").is_err());
        assert!(builder.run("Clean").is_err());
        assert!(builder.run("").is_err());
        assert!(builder.runner().get_calls().is_empty());
    }

    #[test]
    fn clean_runs_exactly_one_process_in_site_root() {
        let builder = orchestrator(MockRunner::succeeding("INFO  Deleted database."));
        let output = builder.run("clean").unwrap();

        assert_eq!(
            builder.runner().get_calls(),
            vec![RecordedCall {
                program: "hexo".into(),
                args: vec!["clean".into()],
                cwd: PathBuf::from("/srv/blog"),
            }]
        );
        assert_eq!(output.operation, BuildOperation::Clean);
        assert_eq!(output.state, BuildState::Succeeded);
        assert_eq!(output.stdout, "INFO  Deleted database.");
    }

    #[test]
    fn every_operation_maps_to_its_own_name() {
        for op in BuildOperation::ALL {
            let builder = orchestrator(MockRunner::succeeding(""));
            builder.execute(op).unwrap();
            assert_eq!(builder.runner().get_calls()[0].args, vec![op.as_str().to_string()]);
        }
    }

    #[test]
    fn leading_command_arguments_precede_operation() {
        let builder = BuildOrchestrator::new(
            MockRunner::succeeding(""),
            "/srv/blog",
            vec!["npx".to_string(), "hexo".to_string()],
        );
        builder.run("generate").unwrap();
        let call = &builder.runner().get_calls()[0];
        assert_eq!(call.program, "npx");
        assert_eq!(call.args, vec!["hexo", "generate"]);
    }

    // =========================================================================
    // Failure reporting
    // =========================================================================

    #[test]
    fn non_zero_exit_carries_diagnostics() {
        let builder = orchestrator(MockRunner::failing(2, "ERROR Deployer not found: git"));
        let err = builder.run("deploy").unwrap_err();
        match err {
            BuildError::ExternalProcess {
                operation,
                command,
                message,
                exit_code,
                stdout,
                stderr,
            } => {
                assert_eq!(operation, BuildOperation::Deploy);
                assert_eq!(command, "hexo deploy");
                assert_eq!(message, "exited with status 2");
                assert_eq!(exit_code, Some(2));
                assert_eq!(stdout, "partial output");
                assert_eq!(stderr, "ERROR Deployer not found: git");
            }
            other => panic!("expected ExternalProcess, got {other:?}"),
        }
    }

    #[test]
    fn spawn_failure_is_external_process_error() {
        let builder = orchestrator(MockRunner::unspawnable());
        let err = builder.run("generate").unwrap_err();
        assert!(matches!(
            &err,
            BuildError::ExternalProcess { message, exit_code: None, .. } if message.contains("could not start hexo")
        ));
        assert_eq!(builder.runner().get_calls().len(), 1);
    }

    #[test]
    fn empty_command_fails_without_spawning() {
        let builder = BuildOrchestrator::new(MockRunner::succeeding(""), "/srv/blog", vec![]);
        assert!(matches!(
            builder.run("clean"),
            Err(BuildError::ExternalProcess { .. })
        ));
        assert!(builder.runner().get_calls().is_empty());
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    #[test]
    fn run_lifecycle_success() {
        let mut run = BuildRun::new(BuildOperation::Generate);
        assert_eq!(run.state(), BuildState::Idle);
        assert!(run.start());
        assert_eq!(run.state(), BuildState::Running);
        assert!(run.finish(true));
        assert_eq!(run.state(), BuildState::Succeeded);
    }

    #[test]
    fn run_lifecycle_rejects_illegal_transitions() {
        let mut run = BuildRun::new(BuildOperation::Deploy);
        assert!(!run.finish(true), "cannot finish before starting");
        assert_eq!(run.state(), BuildState::Idle);

        run.start();
        assert!(!run.start(), "cannot start twice");
        assert!(run.finish(false));
        assert_eq!(run.state(), BuildState::Failed);
        assert!(!run.finish(true), "terminal state is final");
        assert_eq!(run.state(), BuildState::Failed);
    }

    #[test]
    fn operation_parses_from_str() {
        assert_eq!("server".parse::<BuildOperation>().unwrap(), BuildOperation::Server);
        assert_eq!(BuildOperation::Deploy.to_string(), "deploy");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_stdout() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = SystemRunner
            .run("sh", &["-c".to_string(), "pwd".to_string()], tmp.path())
            .unwrap();
        assert!(output.success);
        let printed = std::path::PathBuf::from(output.stdout.trim());
        assert_eq!(
            printed.canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }
}
