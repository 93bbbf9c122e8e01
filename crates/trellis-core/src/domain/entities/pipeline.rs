//! Ordered, validated sequences of action steps.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::domain::{
    common::RelativePath,
    entities::{
        configuration::Configuration,
        step::{ActionStep, CommandLine, Guard, Operation, OperationKind, TextSource},
    },
    error::DomainError,
};

/// Steps in execution order. Fixed once built.
///
/// Invariants (checked by [`PipelineBuilder::build`]):
/// - at least one step
/// - step names are unique
/// - at most one append step per destination path
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    steps: Vec<ActionStep>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn steps(&self) -> &[ActionStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, name: &str) -> Option<&ActionStep> {
        self.steps.iter().find(|s| s.name() == name)
    }

    /// Evaluate guards only. Touches nothing.
    pub fn plan(&self, config: &Configuration) -> Vec<PlannedStep> {
        self.steps
            .iter()
            .map(|step| PlannedStep::from_step(step, Some(step.should_run(config))))
            .collect()
    }

    /// Describe every step without a configuration.
    pub fn outline(&self) -> Vec<PlannedStep> {
        self.steps
            .iter()
            .map(|step| PlannedStep::from_step(step, None))
            .collect()
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.steps.is_empty() {
            return Err(DomainError::InvalidPipeline(
                "pipeline must contain at least one step".into(),
            ));
        }

        let mut names = HashSet::new();
        let mut appends: HashMap<&RelativePath, &str> = HashMap::new();

        for step in &self.steps {
            if !names.insert(step.name()) {
                return Err(DomainError::DuplicateStepName {
                    name: step.name().to_string(),
                });
            }

            if let Operation::AppendText { destination, .. } = step.operation() {
                if let Some(first) = appends.insert(destination, step.name()) {
                    return Err(DomainError::RepeatedAppend {
                        destination: destination.to_string(),
                        first: first.to_string(),
                        second: step.name().to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// How a step would behave for a configuration, without running it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStep {
    pub name: String,
    pub kind: OperationKind,
    pub guard: String,
    pub description: String,
    /// `None` when planned without a configuration.
    pub will_run: Option<bool>,
}

impl PlannedStep {
    fn from_step(step: &ActionStep, will_run: Option<bool>) -> Self {
        Self {
            name: step.name().to_string(),
            kind: step.kind(),
            guard: step.guard().to_string(),
            description: step.operation().describe(),
            will_run,
        }
    }
}

// ── Builder ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct PipelineBuilder {
    steps: Vec<ActionStep>,
}

impl PipelineBuilder {
    pub fn step(mut self, step: ActionStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Add a named group of steps sharing one guard.
    ///
    /// Each step is named `"{group}: {operation}"`, e.g.
    /// `configure_database: render-template config/database.yml`.
    pub fn group(
        mut self,
        name: &str,
        guard: Guard,
        build: impl FnOnce(StepGroup) -> StepGroup,
    ) -> Self {
        let group = build(StepGroup::new(name, guard));
        self.steps.extend(group.steps);
        self
    }

    pub fn build(self) -> Result<Pipeline, DomainError> {
        let pipeline = Pipeline { steps: self.steps };
        pipeline.validate()?;
        Ok(pipeline)
    }
}

/// Steps collected under one group name and guard.
#[derive(Debug)]
pub struct StepGroup {
    name: String,
    guard: Guard,
    steps: Vec<ActionStep>,
}

impl StepGroup {
    fn new(name: &str, guard: Guard) -> Self {
        Self {
            name: name.to_string(),
            guard,
            steps: Vec::new(),
        }
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        let name = format!("{}: {}", self.name, operation.describe());
        self.steps
            .push(ActionStep::new(name, operation).guarded(self.guard));
        self
    }

    /// Copy a template file to the same relative path in the destination.
    pub fn copy_file(self, path: &str) -> Self {
        self.copy_file_to(path, path)
    }

    pub fn copy_file_to(self, source: &str, destination: &str) -> Self {
        self.operation(Operation::CopyFile {
            source: RelativePath::new(source),
            destination: RelativePath::new(destination),
        })
    }

    pub fn copy_directory(self, source: &str, destination: &str) -> Self {
        self.operation(Operation::CopyDirectory {
            source: RelativePath::new(source),
            destination: RelativePath::new(destination),
        })
    }

    pub fn remove_file(self, target: &str) -> Self {
        self.operation(Operation::RemoveFile {
            target: RelativePath::new(target),
        })
    }

    pub fn remove_directory(self, target: &str) -> Self {
        self.operation(Operation::RemoveDirectory {
            target: RelativePath::new(target),
        })
    }

    pub fn render(self, source: &str, destination: &str) -> Self {
        self.operation(Operation::RenderTemplate {
            source: RelativePath::new(source),
            destination: RelativePath::new(destination),
        })
    }

    pub fn append(self, destination: &str, text: TextSource) -> Self {
        self.operation(Operation::AppendText {
            destination: RelativePath::new(destination),
            text,
        })
    }

    pub fn create_empty_file(self, target: &str) -> Self {
        self.operation(Operation::CreateEmptyFile {
            target: RelativePath::new(target),
        })
    }

    pub fn run(self, command: CommandLine, working_dir: &str) -> Self {
        self.operation(Operation::RunCommand {
            command,
            working_dir: RelativePath::new(working_dir),
        })
    }
}
