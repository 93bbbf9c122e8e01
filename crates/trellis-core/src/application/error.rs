//! Application layer errors.
//!
//! These errors represent failures while executing a pipeline, not option
//! validation. Validation errors are `DomainError` from `crate::domain`.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::DomainError;

/// Errors that occur while a pipeline mutates the destination.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// A copy or render step referenced a template file that does not exist.
    #[error("Template source not found: {path}")]
    MissingTemplateSource { path: PathBuf },

    /// An append step targeted a file that does not exist.
    #[error("Cannot append to {path}: file does not exist")]
    MissingAppendTarget { path: PathBuf },

    /// A template referenced a name with no binding.
    #[error("Undefined variable '{name}' in template {template}")]
    UndefinedVariable { name: String, template: String },

    /// Template syntax or evaluation failed.
    #[error("Template rendering failed for {template}: {reason}")]
    RenderingFailed { template: String, reason: String },

    /// External command could not be spawned or exited non-zero.
    #[error("Command `{command}` failed: {reason}")]
    CommandExecution {
        command: String,
        code: Option<i32>,
        reason: String,
    },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// A pipeline step failed; execution stopped here.
    #[error("Step '{step}' failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: Box<ApplicationError>,
    },

    /// Preparing or swapping the staging directory failed. The destination
    /// holds what it held before the run.
    #[error("Staging failed at {path}: {reason}")]
    StagingFailed { path: PathBuf, reason: String },

    /// The staged tree could not replace the destination and the previous
    /// contents could not be moved back; they are still at `previous`.
    #[error("Could not put the staged tree at {destination}: {reason}")]
    SwapIncomplete {
        destination: PathBuf,
        previous: PathBuf,
        reason: String,
    },

    /// A path computed while applying a step would leave its root.
    #[error("{0}")]
    InvalidPath(DomainError),

    /// In-memory adapter lock poisoned.
    #[error("Adapter state lock poisoned")]
    LockPoisoned,
}

impl ApplicationError {
    pub fn filesystem(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::FilesystemError {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingTemplateSource { path } => vec![
                format!("No template file at {}", path.display()),
                "Check --template-dir, or drop it to use the built-in templates".into(),
            ],
            Self::MissingAppendTarget { path } => vec![
                format!("{} must exist before text is appended to it", path.display()),
            ],
            Self::UndefinedVariable { name, .. } => vec![
                format!("The template uses '{}' but no such variable is bound", name),
                "Run `trellis steps` to inspect the pipeline".into(),
            ],
            Self::CommandExecution { command, .. } => vec![
                format!("Re-run `{}` by hand inside the generated directory", command),
                "Or pass --skip-commands to generate without running commands".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::StepFailed { source, .. } => source.suggestions(),
            Self::StagingFailed { .. } => vec![
                "The destination was left as it was before the run".into(),
                "Check free space and permissions next to the destination".into(),
            ],
            Self::SwapIncomplete {
                destination,
                previous,
                ..
            } => vec![
                format!(
                    "{} is missing; its previous contents are at {}",
                    destination.display(),
                    previous.display()
                ),
                format!(
                    "Move {} back to {} by hand",
                    previous.display(),
                    destination.display()
                ),
            ],
            Self::InvalidPath(cause) => {
                let mut hints = cause.suggestions();
                hints.push("Check the file names under --template-dir".into());
                hints
            }
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Name of the step that failed, if known.
    pub fn step_name(&self) -> Option<&str> {
        match self {
            Self::StepFailed { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Innermost cause, unwrapping `StepFailed`.
    pub fn root_cause(&self) -> &ApplicationError {
        match self {
            Self::StepFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
