//! Error handling for the Trellis CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Exit code mapping

use std::error::Error;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

use trellis_core::error::TrellisError;

pub use trellis_core::error::ErrorCategory as CoreCategory;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input (bad options file, unusable destination).
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The destination cannot name an application.
    #[error("Invalid destination '{}': {reason}", path.display())]
    InvalidDestination { path: PathBuf, reason: String },

    // ── Config errors ──────────────────────────────────────────────────────
    /// A configuration file could not be read, parsed, or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── Core errors ────────────────────────────────────────────────────────
    /// An error propagated from `trellis-core`.
    #[error("{0}")]
    Core(#[from] TrellisError),

    // ── System errors ──────────────────────────────────────────────────────
    /// An I/O operation failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message, .. } => vec![
                format!("Check your input: {}", message),
                "Use --help for usage information".into(),
            ],

            Self::InvalidDestination { .. } => vec![
                "Pass a directory path such as ./acme".into(),
                "Or set the name explicitly with --app-name".into(),
            ],

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {}", message),
                "Print the config file location with 'trellis config path'".into(),
                "Use 'trellis init --force' to write a fresh default config".into(),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {}", message),
                "Check file permissions".into(),
            ],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::InvalidDestination { .. } => {
                ErrorCategory::UserError
            }
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Execution => ErrorCategory::Execution,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  1   |
    /// | Configuration |  1   |
    /// | Execution     |  2   |
    /// | Internal      |  2   |
    ///
    /// Code 1 always means nothing was written.
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError | ErrorCategory::Configuration => 1,
            ErrorCategory::Execution | ErrorCategory::Internal => 2,
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "✗".red().bold(),
            "Error:".red().bold()
        ));

        output.push_str(&format!("  {}\n", self.to_string().red()));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!(
                    "\n  {} {}\n",
                    "→".dimmed(),
                    err.to_string().dimmed()
                ));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {}\n", suggestion));
            }
        }

        if !verbose {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(), // ℹ
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`], without ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("\nError: {}\n", self));

        if verbose {
            let mut src = std::error::Error::source(self);
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Execution => tracing::error!("Scaffold failed: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected before anything was written.
    UserError,
    /// Configuration error.
    Configuration,
    /// A step failed after the destination was touched.
    Execution,
    /// Internal/system error.
    Internal,
}

// ── IntoCli trait ─────────────────────────────────────────────────────────────

/// Extension trait to convert foreign error types into [`CliError`] at
/// call-sites with a descriptive context message.
pub trait IntoCli<T> {
    /// Convert to `CliResult` attaching a human-readable context message.
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use trellis_core::{application::ApplicationError, domain::DomainError};

    fn unsupported_backend() -> CliError {
        CliError::Core(TrellisError::Domain(DomainError::UnsupportedBackend {
            value: "oracle".into(),
        }))
    }

    fn command_failure() -> CliError {
        CliError::Core(TrellisError::Application(ApplicationError::StepFailed {
            step: "install_dependencies: run-command `bundle install` in .".into(),
            source: Box::new(ApplicationError::CommandExecution {
                command: "bundle install".into(),
                code: Some(1),
                reason: "exited with status 1".into(),
            }),
        }))
    }

    // ── suggestions ───────────────────────────────────────────────────────

    #[test]
    fn unsupported_backend_suggestions_list_choices() {
        let suggestions = unsupported_backend().suggestions();
        assert!(suggestions.iter().any(|s| s.contains("postgresql")));
    }

    #[test]
    fn invalid_destination_suggests_app_name() {
        let err = CliError::InvalidDestination {
            path: PathBuf::from("/"),
            reason: "has no directory name".into(),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("--app-name")));
    }

    // ── exit codes ────────────────────────────────────────────────────────

    #[test]
    fn validation_failures_exit_one() {
        assert_eq!(unsupported_backend().exit_code(), 1);
        assert_eq!(
            CliError::InvalidInput {
                message: "x".into(),
                source: None
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn configuration_errors_exit_one() {
        assert_eq!(
            CliError::ConfigError {
                message: "x".into(),
                source: None
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn execution_failures_exit_two() {
        assert_eq!(command_failure().exit_code(), 2);
        assert_eq!(
            CliError::IoError {
                message: "x".into(),
                source: io::Error::other("e"),
            }
            .exit_code(),
            2
        );
    }

    // ── format ────────────────────────────────────────────────────────────

    #[test]
    fn format_plain_contains_error_header() {
        let s = unsupported_backend().format_plain(false);
        assert!(s.contains("Error:"));
        assert!(s.contains("oracle"));
        assert!(s.contains("Suggestions:"));
    }

    #[test]
    fn format_plain_verbose_shows_cause_chain() {
        let s = command_failure().format_plain(true);
        assert!(s.contains("Caused by:"));
        assert!(!s.contains("--verbose"));
    }

    // ── IntoCli ───────────────────────────────────────────────────────────

    #[test]
    fn into_cli_io_error() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let cli: CliResult<()> = result.with_cli_context(|| "reading options");
        assert!(matches!(cli, Err(CliError::IoError { .. })));
    }
}
