//! Subprocess execution behind an injectable [`Executor`] seam.
use std::process::{Command, Stdio};

use crate::error::ExecError;

/// How a child's standard output is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect stdout into [`ExecResult::stdout`]; stderr still reaches the user.
    Capture,
    /// Stream stdout and stderr straight to the invoking terminal.
    Inherit,
}

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured stdout; empty for [`OutputMode::Inherit`].
    pub stdout: Vec<u8>,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl ExecResult {
    /// Captured stdout decoded lossily as UTF-8.
    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Abstraction over process execution so package logic can be tested
/// without real package managers.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run `program` with `args`, returning the result whatever the exit status.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::Spawn`] if the process cannot be started.
    fn execute(
        &self,
        program: &str,
        args: &[&str],
        mode: OutputMode,
    ) -> Result<ExecResult, ExecError>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;

    /// Run a command and fail if it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::Spawn`] if the process cannot be started and
    /// [`ExecError::Failed`] on a non-zero exit.
    fn run(
        &self,
        program: &str,
        args: &[&str],
        mode: OutputMode,
    ) -> Result<ExecResult, ExecError> {
        let result = self.execute(program, args, mode)?;
        if !result.success {
            return Err(ExecError::Failed {
                program: program.to_string(),
                code: result.code.unwrap_or(-1),
            });
        }
        Ok(result)
    }
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(
        &self,
        program: &str,
        args: &[&str],
        mode: OutputMode,
    ) -> Result<ExecResult, ExecError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit());

        let spawn_err = |source| ExecError::Spawn {
            program: program.to_string(),
            source,
        };

        match mode {
            OutputMode::Capture => {
                let output = cmd.stdout(Stdio::piped()).output().map_err(spawn_err)?;
                Ok(ExecResult {
                    stdout: output.stdout,
                    success: output.status.success(),
                    code: output.status.code(),
                })
            }
            OutputMode::Inherit => {
                let status = cmd.stdout(Stdio::inherit()).status().map_err(spawn_err)?;
                Ok(ExecResult {
                    stdout: Vec::new(),
                    success: status.success(),
                    code: status.code(),
                })
            }
        }
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
