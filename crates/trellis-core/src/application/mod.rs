//! Application layer for Trellis.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (ScaffoldService, PipelineExecutor)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. Rules, guards and plans live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    ExecutionMode, ExecutionReport, PipelineExecutor, ScaffoldService, StepOutcome, StepStatus,
};

// Re-export port traits (for adapter implementation)
pub use ports::{
    CommandOutcome, CommandRunner, Filesystem, TemplateFile, TemplateRenderer, TemplateSource,
};

pub use error::ApplicationError;
