//! Runners that never spawn anything.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use tracing::info;

use trellis_core::{
    application::{ApplicationError, CommandOutcome, CommandRunner},
    domain::CommandLine,
    error::TrellisResult,
};

/// One call seen by a [`RecordingCommandRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub command: CommandLine,
    pub working_dir: PathBuf,
}

#[derive(Debug, Default)]
struct Recording {
    calls: Vec<RecordedCommand>,
    failures: BTreeMap<String, i32>,
}

/// Records every command instead of running it (testing).
///
/// Commands whose rendered line was registered with
/// [`fail_with`](Self::fail_with) return a `CommandExecution` error with that
/// exit code. Clones share the same recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingCommandRunner {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `command` (matched on its display form) exit with `code`.
    pub fn fail_with(self, command: impl Into<String>, code: i32) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failures.insert(command.into(), code);
        }
        self
    }

    /// Everything run so far, in order.
    pub fn calls(&self) -> Vec<RecordedCommand> {
        self.inner
            .lock()
            .map(|inner| inner.calls.clone())
            .unwrap_or_default()
    }
}

impl CommandRunner for RecordingCommandRunner {
    fn run(&self, command: &CommandLine, working_dir: &Path) -> TrellisResult<CommandOutcome> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| ApplicationError::LockPoisoned)?;
        inner.calls.push(RecordedCommand {
            command: command.clone(),
            working_dir: working_dir.to_path_buf(),
        });

        let line = command.to_string();
        match inner.failures.get(&line) {
            Some(&code) => Err(ApplicationError::CommandExecution {
                command: line,
                code: Some(code),
                reason: format!("exited with status {}", code),
            }
            .into()),
            None => Ok(CommandOutcome::success()),
        }
    }
}

/// Logs each command and reports success without running it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkippingCommandRunner;

impl SkippingCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SkippingCommandRunner {
    fn run(&self, command: &CommandLine, working_dir: &Path) -> TrellisResult<CommandOutcome> {
        info!(
            command = %command,
            dir = %working_dir.display(),
            "Skipping command"
        );
        Ok(CommandOutcome::success())
    }
}
