// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (reported once, logged many times)
/// - Categorizable (for CLI display and exit codes)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Option Validation (raised before any destination mutation)
    // ========================================================================
    #[error("{message} (rule '{rule}', option '{option}', expected {expected})")]
    ConfigValidation {
        rule: String,
        option: String,
        expected: String,
        message: String,
    },

    #[error(
        "Unsupported database backend '{value}' (option 'database', expected one of: sqlite3, mysql, postgresql)"
    )]
    UnsupportedBackend { value: String },

    // ========================================================================
    // Definition Errors (a blueprint or pipeline is malformed)
    // ========================================================================
    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(String),

    #[error("Duplicate step name in pipeline: {name}")]
    DuplicateStepName { name: String },

    #[error("Steps '{first}' and '{second}' both append to {destination}")]
    RepeatedAppend {
        destination: String,
        first: String,
        second: String,
    },

    #[error("Path must stay inside the destination: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Invalid blueprint: {0}")]
    InvalidBlueprint(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ConfigValidation {
                option, expected, ..
            } => vec![
                format!("Set '{}' to {}", option, expected),
                "Run `trellis new --help` to see every option".into(),
            ],
            Self::UnsupportedBackend { .. } => vec![
                "Supported databases: sqlite3, mysql, postgresql (alias: postgres)".into(),
                "Or pass --skip-active-record to generate without a database".into(),
            ],
            Self::DuplicateStepName { name } => vec![
                format!("Rename one of the steps called '{}'", name),
            ],
            Self::RepeatedAppend { destination, .. } => vec![
                format!("Merge the appends to {} into one step", destination),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigValidation { .. } | Self::UnsupportedBackend { .. } => {
                ErrorCategory::Validation
            }
            _ => ErrorCategory::Definition,
        }
    }

    /// The option a validation error points at, if any.
    pub fn option(&self) -> Option<&str> {
        match self {
            Self::ConfigValidation { option, .. } => Some(option),
            Self::UnsupportedBackend { .. } => Some("database"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User-supplied options were rejected.
    Validation,
    /// A blueprint, pipeline, or path definition is malformed.
    Definition,
}
