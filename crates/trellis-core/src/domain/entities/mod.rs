pub mod blueprint;
pub mod configuration;
pub mod pipeline;
pub mod step;

pub use blueprint::{Blueprint, BlueprintBuilder, TemplateId};
pub use configuration::{Bindings, Configuration, DerivedContext, RawOptions};
pub use pipeline::{Pipeline, PipelineBuilder, PlannedStep, StepGroup};
pub use step::{ActionStep, CommandLine, Guard, Operation, OperationKind, TextSource};
