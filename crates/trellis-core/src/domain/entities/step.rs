//! Action steps: one named, guarded filesystem operation each.

use serde::Serialize;
use std::fmt;

use crate::domain::{
    common::RelativePath, entities::configuration::Configuration, value_objects::Feature,
};

// ── Guard ────────────────────────────────────────────────────────────────────

/// Predicate deciding whether a step runs.
///
/// Guards see only the resolved [`Configuration`]; they cannot observe the
/// filesystem.
#[derive(Clone, Copy)]
pub enum Guard {
    Always,
    /// Run when the toggle is enabled.
    When(Feature),
    /// Run when the toggle is disabled.
    Unless(Feature),
    Custom {
        name: &'static str,
        predicate: fn(&Configuration) -> bool,
    },
}

impl Guard {
    pub fn custom(name: &'static str, predicate: fn(&Configuration) -> bool) -> Self {
        Self::Custom { name, predicate }
    }

    pub fn evaluate(&self, config: &Configuration) -> bool {
        match self {
            Self::Always => true,
            Self::When(feature) => config.is_enabled(*feature),
            Self::Unless(feature) => !config.is_enabled(*feature),
            Self::Custom { predicate, .. } => predicate(config),
        }
    }

    /// Toggle this guard depends on, if it is a plain feature guard.
    pub fn feature(&self) -> Option<Feature> {
        match self {
            Self::When(f) | Self::Unless(f) => Some(*f),
            _ => None,
        }
    }
}

impl Default for Guard {
    fn default() -> Self {
        Self::Always
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::When(feature) => write!(f, "when {}", feature),
            Self::Unless(feature) => write!(f, "unless {}", feature),
            Self::Custom { name, .. } => f.write_str(name),
        }
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guard({})", self)
    }
}

// Function pointers have no meaningful equality; compare guards by name.
impl PartialEq for Guard {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

// ── Operation ────────────────────────────────────────────────────────────────

/// Text appended by an append step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    /// Appended verbatim.
    Literal(String),
    /// Rendered with the run's bindings first.
    Template(String),
}

/// An external command and its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// The filesystem effect of one step.
///
/// `source` paths are relative to the template source; every other path is
/// relative to the destination root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CopyFile {
        source: RelativePath,
        destination: RelativePath,
    },
    CopyDirectory {
        source: RelativePath,
        destination: RelativePath,
    },
    RemoveFile {
        target: RelativePath,
    },
    RemoveDirectory {
        target: RelativePath,
    },
    RenderTemplate {
        source: RelativePath,
        destination: RelativePath,
    },
    AppendText {
        destination: RelativePath,
        text: TextSource,
    },
    CreateEmptyFile {
        target: RelativePath,
    },
    RunCommand {
        command: CommandLine,
        working_dir: RelativePath,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::CopyFile { .. } => OperationKind::CopyFile,
            Self::CopyDirectory { .. } => OperationKind::CopyDirectory,
            Self::RemoveFile { .. } => OperationKind::RemoveFile,
            Self::RemoveDirectory { .. } => OperationKind::RemoveDirectory,
            Self::RenderTemplate { .. } => OperationKind::RenderTemplate,
            Self::AppendText { .. } => OperationKind::AppendText,
            Self::CreateEmptyFile { .. } => OperationKind::CreateEmptyFile,
            Self::RunCommand { .. } => OperationKind::RunCommand,
        }
    }

    /// Destination-relative path this operation writes or deletes.
    pub fn target(&self) -> Option<&RelativePath> {
        match self {
            Self::CopyFile { destination, .. }
            | Self::CopyDirectory { destination, .. }
            | Self::RenderTemplate { destination, .. }
            | Self::AppendText { destination, .. } => Some(destination),
            Self::RemoveFile { target }
            | Self::RemoveDirectory { target }
            | Self::CreateEmptyFile { target } => Some(target),
            Self::RunCommand { .. } => None,
        }
    }

    /// One-line human description, e.g. `render-template config/database.yml`.
    pub fn describe(&self) -> String {
        match self {
            Self::RunCommand {
                command,
                working_dir,
            } => format!("{} `{}` in {}", self.kind(), command, working_dir),
            other => match other.target() {
                Some(target) => format!("{} {}", other.kind(), target),
                None => other.kind().to_string(),
            },
        }
    }
}

/// Operation tag, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    CopyFile,
    CopyDirectory,
    RemoveFile,
    RemoveDirectory,
    RenderTemplate,
    AppendText,
    CreateEmptyFile,
    RunCommand,
}

impl OperationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CopyFile => "copy-file",
            Self::CopyDirectory => "copy-directory",
            Self::RemoveFile => "remove-file",
            Self::RemoveDirectory => "remove-directory",
            Self::RenderTemplate => "render-template",
            Self::AppendText => "append-text",
            Self::CreateEmptyFile => "create-empty-file",
            Self::RunCommand => "run-command",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ActionStep ───────────────────────────────────────────────────────────────

/// A named, guarded operation. Names are unique within a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionStep {
    name: String,
    guard: Guard,
    operation: Operation,
}

impl ActionStep {
    pub fn new(name: impl Into<String>, operation: Operation) -> Self {
        Self {
            name: name.into(),
            guard: Guard::Always,
            operation,
        }
    }

    pub fn guarded(mut self, guard: Guard) -> Self {
        self.guard = guard;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn kind(&self) -> OperationKind {
        self.operation.kind()
    }

    pub fn should_run(&self, config: &Configuration) -> bool {
        self.guard.evaluate(config)
    }
}
