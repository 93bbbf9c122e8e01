//! Runs commands as child processes.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info, instrument};

use trellis_core::{
    application::{ApplicationError, CommandOutcome, CommandRunner},
    domain::CommandLine,
    error::TrellisResult,
};

/// Spawns the program, inherits stdout and stderr, and waits for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCommandRunner;

impl ProcessCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessCommandRunner {
    #[instrument(skip_all, fields(command = %command, dir = %working_dir.display()))]
    fn run(&self, command: &CommandLine, working_dir: &Path) -> TrellisResult<CommandOutcome> {
        info!("Running command");

        let mut child = Command::new(command.program())
            .args(command.arguments())
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| ApplicationError::CommandExecution {
                command: command.to_string(),
                code: None,
                reason: format!("failed to start: {}", e),
            })?;

        let status = child.wait().map_err(|e| ApplicationError::CommandExecution {
            command: command.to_string(),
            code: None,
            reason: format!("failed to wait: {}", e),
        })?;

        if !status.success() {
            return Err(ApplicationError::CommandExecution {
                command: command.to_string(),
                code: status.code(),
                reason: format!("exited with {}", status),
            }
            .into());
        }

        debug!("Command finished");
        Ok(CommandOutcome {
            code: status.code().unwrap_or(0),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use trellis_core::error::TrellisError;

    #[test]
    fn successful_command_runs_in_working_dir() {
        let dir = TempDir::new().unwrap();
        let command = CommandLine::new("touch").arg("marker");

        let outcome = ProcessCommandRunner::new().run(&command, dir.path()).unwrap();

        assert_eq!(outcome, CommandOutcome::success());
        assert!(dir.path().join("marker").exists());
    }

    #[test]
    fn non_zero_exit_carries_the_code() {
        let dir = TempDir::new().unwrap();
        let command = CommandLine::new("sh").args(["-c", "exit 3"]);

        let err = ProcessCommandRunner::new().run(&command, dir.path()).unwrap_err();

        assert!(matches!(
            err,
            TrellisError::Application(ApplicationError::CommandExecution { code: Some(3), .. })
        ));
    }

    #[test]
    fn missing_program_has_no_code() {
        let dir = TempDir::new().unwrap();
        let command = CommandLine::new("trellis-definitely-not-a-program");

        let err = ProcessCommandRunner::new().run(&command, dir.path()).unwrap_err();

        assert!(matches!(
            err,
            TrellisError::Application(ApplicationError::CommandExecution { code: None, .. })
        ));
    }
}
