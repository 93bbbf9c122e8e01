//! Trellis Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Trellis
//! scaffolding engine, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           trellis-cli (CLI)             │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │   (ScaffoldService, PipelineExecutor)   │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, TemplateSource, Renderer,  │
//! │           CommandRunner)                │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    trellis-adapters (Infrastructure)    │
//! │ (LocalFilesystem, MiniJinjaRenderer...) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Configuration, ActionStep, Pipeline,   │
//! │          Blueprint, Rules)              │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trellis_core::prelude::*;
//!
//! let service = ScaffoldService::new(source, renderer, filesystem, runner);
//! let options = RawOptions::new()
//!     .with("app_name", "acme")
//!     .with("database", "postgresql");
//!
//! let report = service.scaffold(&blueprint, &options, "./acme", ExecutionMode::Direct)?;
//! println!("{} steps applied", report.applied_count());
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ExecutionMode, ExecutionReport, PipelineExecutor, ScaffoldService, StepOutcome,
        StepStatus,
        ports::{CommandOutcome, CommandRunner, Filesystem, TemplateFile, TemplateRenderer, TemplateSource},
    };
    pub use crate::domain::{
        ActionStep, Backend, Bindings, Blueprint, CommandLine, Configuration, ConfigurationResolver,
        Environment, Feature, Guard, Operation, OperationKind, Pipeline, PlannedStep, RawOptions,
        RelativePath, TemplateId, TextSource, ValidationRule,
    };
    pub use crate::error::{TrellisError, TrellisResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
