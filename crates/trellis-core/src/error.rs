//! Unified error handling for Trellis Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Trellis Core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrellisError {
    /// Errors from the domain layer (option validation, definition bugs).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (step execution failures).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl TrellisError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Trellis".into(),
                "Please report this issue at: https://github.com/cosecruz/trellis/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Definition => ErrorCategory::Internal,
            },
            Self::Application(_) => ErrorCategory::Execution,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// True when the error was raised before any destination mutation.
    pub fn is_validation(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }

    /// Name of the failing step, if the error came out of the executor.
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            Self::Application(e) => e.step_name(),
            _ => None,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Raw options rejected; nothing was written.
    Validation,
    /// A step, render, or command failed mid-run.
    Execution,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type TrellisResult<T> = Result<T, TrellisError>;
