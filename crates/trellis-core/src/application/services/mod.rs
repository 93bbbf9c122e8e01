//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "scaffold an application" or "plan a run".

pub mod executor;
pub mod scaffold_service;

pub use executor::{ExecutionReport, PipelineExecutor, StepOutcome, StepStatus};
pub use scaffold_service::{ExecutionMode, ScaffoldService};
