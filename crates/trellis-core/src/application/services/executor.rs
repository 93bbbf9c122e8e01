//! Pipeline Executor - runs an ordered pipeline against a destination root.
//!
//! Steps run strictly in declaration order. A false guard skips the step; the
//! first failing step aborts the run with [`ApplicationError::StepFailed`].
//! Nothing already written is rolled back here (see `ExecutionMode::Staged`).

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{CommandRunner, Filesystem, TemplateFile, TemplateRenderer, TemplateSource},
    },
    domain::{
        ActionStep, Bindings, Configuration, Operation, OperationKind, Pipeline, RelativePath,
        TextSource,
    },
    error::{TrellisError, TrellisResult},
};

// ── Report ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Applied,
    Skipped,
}

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: String,
    pub kind: OperationKind,
    pub status: StepStatus,
    /// Destination-relative paths written or removed, in order.
    pub paths: Vec<PathBuf>,
}

/// Per-step outcomes of one run, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    destination: PathBuf,
    outcomes: Vec<StepOutcome>,
}

impl ExecutionReport {
    fn new(destination: &Path) -> Self {
        Self {
            destination: destination.to_path_buf(),
            outcomes: Vec::new(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub(crate) fn relocate(mut self, destination: &Path) -> Self {
        self.destination = destination.to_path_buf();
        self
    }

    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    pub fn applied(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == StepStatus::Applied)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == StepStatus::Skipped)
    }

    pub fn applied_count(&self) -> usize {
        self.applied().count()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped().count()
    }

    pub fn outcome(&self, step: &str) -> Option<&StepOutcome> {
        self.outcomes.iter().find(|o| o.step == step)
    }
}

// ── Executor ─────────────────────────────────────────────────────────────────

/// Runs pipelines through the driven ports.
pub struct PipelineExecutor<'a> {
    source: &'a dyn TemplateSource,
    renderer: &'a dyn TemplateRenderer,
    filesystem: &'a dyn Filesystem,
    runner: &'a dyn CommandRunner,
}

impl<'a> PipelineExecutor<'a> {
    pub fn new(
        source: &'a dyn TemplateSource,
        renderer: &'a dyn TemplateRenderer,
        filesystem: &'a dyn Filesystem,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            source,
            renderer,
            filesystem,
            runner,
        }
    }

    /// Execute every step whose guard holds, in order.
    ///
    /// # Errors
    ///
    /// `StepFailed` wrapping the first failing step's cause. Steps before it
    /// have already taken effect.
    #[instrument(
        skip_all,
        fields(steps = pipeline.len(), destination = %destination_root.display())
    )]
    pub fn execute(
        &self,
        pipeline: &Pipeline,
        config: &Configuration,
        destination_root: &Path,
    ) -> TrellisResult<ExecutionReport> {
        let bindings = config.bindings();
        let mut report = ExecutionReport::new(destination_root);

        for step in pipeline.steps() {
            if !step.should_run(config) {
                debug!(step = step.name(), guard = %step.guard(), "guard false, skipping");
                report.outcomes.push(StepOutcome {
                    step: step.name().to_string(),
                    kind: step.kind(),
                    status: StepStatus::Skipped,
                    paths: Vec::new(),
                });
                continue;
            }

            debug!(step = step.name(), "applying");
            let paths = self
                .apply(step, &bindings, destination_root)
                .map_err(|err| wrap_step_failure(step, err))?;

            info!(step = step.name(), paths = paths.len(), "step applied");
            report.outcomes.push(StepOutcome {
                step: step.name().to_string(),
                kind: step.kind(),
                status: StepStatus::Applied,
                paths,
            });
        }

        info!(
            applied = report.applied_count(),
            skipped = report.skipped_count(),
            "pipeline complete"
        );
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    fn apply(
        &self,
        step: &ActionStep,
        bindings: &Bindings,
        root: &Path,
    ) -> TrellisResult<Vec<PathBuf>> {
        match step.operation() {
            Operation::CopyFile {
                source,
                destination,
            } => {
                self.copy_file(source, destination, root)?;
                Ok(vec![destination.as_path().to_path_buf()])
            }
            Operation::CopyDirectory {
                source,
                destination,
            } => self.copy_directory(source, destination, root),
            Operation::RemoveFile { target } => {
                let path = target.under(root);
                if !self.filesystem.exists(&path) {
                    return Ok(Vec::new());
                }
                self.filesystem.remove_file(&path)?;
                Ok(vec![target.as_path().to_path_buf()])
            }
            Operation::RemoveDirectory { target } => {
                let path = target.under(root);
                if !self.filesystem.exists(&path) {
                    return Ok(Vec::new());
                }
                self.filesystem.remove_dir_all(&path)?;
                Ok(vec![target.as_path().to_path_buf()])
            }
            Operation::RenderTemplate {
                source,
                destination,
            } => {
                let file = self.read_source(source)?;
                let text = decode(source, file.contents)?;
                let rendered = self.renderer.render(&source.as_str(), &text, bindings)?;
                self.write(&destination.under(root), rendered.as_bytes(), file.executable)?;
                Ok(vec![destination.as_path().to_path_buf()])
            }
            Operation::AppendText { destination, text } => {
                let path = destination.under(root);
                if !self.filesystem.is_file(&path) {
                    return Err(ApplicationError::MissingAppendTarget { path }.into());
                }
                let text = match text {
                    TextSource::Literal(literal) => literal.clone(),
                    TextSource::Template(template) => {
                        self.renderer.render(step.name(), template, bindings)?
                    }
                };
                self.filesystem.append_file(&path, text.as_bytes())?;
                Ok(vec![destination.as_path().to_path_buf()])
            }
            Operation::CreateEmptyFile { target } => {
                let path = target.under(root);
                if self.filesystem.exists(&path) {
                    return Ok(Vec::new());
                }
                self.write(&path, b"", false)?;
                Ok(vec![target.as_path().to_path_buf()])
            }
            Operation::RunCommand {
                command,
                working_dir,
            } => {
                let dir = working_dir.under(root);
                let outcome = self.runner.run(command, &dir)?;
                debug!(command = %command, code = outcome.code, "command finished");
                Ok(Vec::new())
            }
        }
    }

    fn copy_file(
        &self,
        source: &RelativePath,
        destination: &RelativePath,
        root: &Path,
    ) -> TrellisResult<()> {
        let file = self.read_source(source)?;
        self.write(&destination.under(root), &file.contents, file.executable)
    }

    fn copy_directory(
        &self,
        source: &RelativePath,
        destination: &RelativePath,
        root: &Path,
    ) -> TrellisResult<Vec<PathBuf>> {
        let entries = self.source.list(source)?;
        if entries.is_empty() {
            return Err(ApplicationError::MissingTemplateSource {
                path: source.as_path().to_path_buf(),
            }
            .into());
        }

        let mut written = Vec::with_capacity(entries.len());
        for entry in entries {
            let from = source.join(entry.as_path())?;
            let to = destination.join(entry.as_path())?;
            self.copy_file(&from, &to, root)?;
            written.push(to.into_path_buf());
        }
        Ok(written)
    }

    fn read_source(&self, path: &RelativePath) -> TrellisResult<TemplateFile> {
        self.source.read(path)?.ok_or_else(|| {
            ApplicationError::MissingTemplateSource {
                path: path.as_path().to_path_buf(),
            }
            .into()
        })
    }

    /// Write with parents created; overwrite unconditionally. The exec bit
    /// always ends up matching `executable`, even over an existing file.
    fn write(&self, path: &Path, contents: &[u8], executable: bool) -> TrellisResult<()> {
        if let Some(parent) = path.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        self.filesystem.write_file(path, contents)?;
        self.filesystem.set_permissions(path, executable)
    }
}

fn decode(source: &RelativePath, bytes: Vec<u8>) -> TrellisResult<String> {
    String::from_utf8(bytes).map_err(|_| {
        ApplicationError::RenderingFailed {
            template: source.as_str(),
            reason: "template is not valid UTF-8".into(),
        }
        .into()
    })
}

fn wrap_step_failure(step: &ActionStep, err: TrellisError) -> TrellisError {
    let cause = match err {
        TrellisError::Application(cause) => cause,
        TrellisError::Domain(cause) => ApplicationError::InvalidPath(cause),
        other => return other,
    };
    ApplicationError::StepFailed {
        step: step.name().to_string(),
        source: Box::new(cause),
    }
    .into()
}
