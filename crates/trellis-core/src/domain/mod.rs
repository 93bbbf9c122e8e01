// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Trellis.
//!
//! This module contains pure business logic. All I/O, templating, and
//! process concerns are handled via ports (traits) defined in the
//! application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Immutable entities**: `Configuration`, `Pipeline` and `Blueprint` never change after construction
//! - **Rich domain model**: Guards, rules and plans live on the entities
//!
// Public API - what the world sees
pub mod common;
pub mod entities;
pub mod error;
pub mod resolver;
pub mod validation;
pub mod value_objects;

// Re-exports for convenience
pub use common::RelativePath;
pub use entities::{
    ActionStep, Bindings, Blueprint, BlueprintBuilder, CommandLine, Configuration,
    DerivedContext, Guard, Operation, OperationKind, Pipeline, PipelineBuilder, PlannedStep,
    RawOptions, StepGroup, TemplateId, TextSource, configuration::options,
};
pub use error::{DomainError, ErrorCategory};
pub use resolver::ConfigurationResolver;
pub use validation::{RuleCheck, ValidationRule, builtin_rules};
pub use value_objects::{Backend, Environment, Feature};
