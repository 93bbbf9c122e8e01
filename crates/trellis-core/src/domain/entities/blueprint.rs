//! Blueprint aggregate: a named, versioned template definition.
//!
//! ```text
//! Blueprint
//! ├── TemplateId       name@version
//! ├── description
//! ├── Vec<ValidationRule>   checked after the built-in rules
//! └── Pipeline              ordered, guarded steps
//! ```
//!
//! The template files a blueprint's steps reference are not part of the
//! aggregate; they are read through the `TemplateSource` port at run time.

use std::fmt;

use crate::domain::{
    entities::pipeline::Pipeline, error::DomainError, resolver::ConfigurationResolver,
    validation::ValidationRule,
};

/// Blueprint identity, displayed as `name@version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateId {
    /// Blueprint name (e.g., "rails")
    name: String,
    /// SemVer version string (e.g., "1.0.0")
    version: String,
}

impl TemplateId {
    /// Create a new template ID.
    ///
    /// # Panics
    ///
    /// Panics if name contains `@`. This is a programming error (invalid
    /// blueprint name), not a runtime error.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        let version = version.into();
        assert!(
            !name.contains('@'),
            "Template name cannot contain @: {}",
            name
        );
        Self { name, version }
    }

    /// Parse from string format `name@version`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBlueprint` if format is wrong (missing `@` or multiple `@`).
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.split('@').collect::<Vec<_>>().as_slice() {
            [name, version] if !name.is_empty() && !version.is_empty() => {
                Ok(Self::new(*name, *version))
            }
            _ => Err(DomainError::InvalidBlueprint(format!(
                "Invalid template ID format: {}. Expected 'name@version'",
                s
            ))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Rules plus pipeline under one identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    id: TemplateId,
    description: String,
    rules: Vec<ValidationRule>,
    pipeline: Pipeline,
}

impl Blueprint {
    pub fn builder() -> BlueprintBuilder {
        BlueprintBuilder::default()
    }

    pub fn id(&self) -> &TemplateId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Blueprint-specific rules (built-ins excluded).
    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Resolver carrying the built-in rules followed by this blueprint's.
    pub fn resolver(&self) -> ConfigurationResolver {
        ConfigurationResolver::new(&self.rules)
    }
}

#[derive(Debug, Default)]
pub struct BlueprintBuilder {
    id: Option<TemplateId>,
    description: Option<String>,
    rules: Vec<ValidationRule>,
    pipeline: Option<Pipeline>,
}

impl BlueprintBuilder {
    pub fn id(mut self, id: TemplateId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    pub fn build(self) -> Result<Blueprint, DomainError> {
        let id = self
            .id
            .ok_or(DomainError::MissingRequiredField { field: "id" })?;
        let pipeline = self
            .pipeline
            .ok_or(DomainError::MissingRequiredField { field: "pipeline" })?;

        let mut seen = std::collections::HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.name()) {
                return Err(DomainError::InvalidBlueprint(format!(
                    "rule '{}' declared twice in {}",
                    rule.name(),
                    id
                )));
            }
        }

        Ok(Blueprint {
            description: self.description.unwrap_or_else(|| id.to_string()),
            id,
            rules: self.rules,
            pipeline,
        })
    }
}
