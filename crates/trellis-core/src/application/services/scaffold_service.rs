//! Scaffold Service - main application orchestrator.
//!
//! This service coordinates the entire scaffolding workflow:
//! 1. Resolve raw options into a validated configuration
//! 2. Optionally prepare a staging directory
//! 3. Execute the blueprint's pipeline
//! 4. Swap the staged tree into place (staged mode only)
//!
//! It implements the driving port (incoming) and uses driven ports (outgoing).

use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError,
        ports::{CommandRunner, Filesystem, TemplateRenderer, TemplateSource},
        services::executor::{ExecutionReport, PipelineExecutor},
    },
    domain::{Blueprint, Configuration, PlannedStep, RawOptions},
    error::TrellisResult,
};

/// Where the pipeline writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Straight into the destination. A failure leaves partial output.
    #[default]
    Direct,
    /// Into a sibling staging directory, swapped in only on success.
    Staged,
}

/// Main scaffolding service.
///
/// Orchestrates option resolution, pipeline execution, and staging.
pub struct ScaffoldService {
    source: Box<dyn TemplateSource>,
    renderer: Box<dyn TemplateRenderer>,
    filesystem: Box<dyn Filesystem>,
    runner: Box<dyn CommandRunner>,
}

impl ScaffoldService {
    /// Create a new scaffold service with the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use trellis_core::application::ScaffoldService;
    ///
    /// let service = ScaffoldService::new(
    ///     source,     // impl TemplateSource
    ///     renderer,   // impl TemplateRenderer
    ///     filesystem, // impl Filesystem
    ///     runner,     // impl CommandRunner
    /// );
    /// ```
    pub fn new(
        source: Box<dyn TemplateSource>,
        renderer: Box<dyn TemplateRenderer>,
        filesystem: Box<dyn Filesystem>,
        runner: Box<dyn CommandRunner>,
    ) -> Self {
        Self {
            source,
            renderer,
            filesystem,
            runner,
        }
    }

    /// Validate raw options against a blueprint. Touches nothing.
    pub fn resolve(&self, blueprint: &Blueprint, raw: &RawOptions) -> TrellisResult<Configuration> {
        Ok(blueprint.resolver().resolve(raw)?)
    }

    /// Resolve options and report which steps would run. Touches nothing.
    pub fn plan(&self, blueprint: &Blueprint, raw: &RawOptions) -> TrellisResult<Vec<PlannedStep>> {
        let config = self.resolve(blueprint, raw)?;
        Ok(blueprint.pipeline().plan(&config))
    }

    /// Scaffold a new application.
    ///
    /// Options are fully validated before the destination is touched; a
    /// validation failure leaves the filesystem unchanged.
    #[instrument(
        skip_all,
        fields(
            blueprint = %blueprint.id(),
            destination = %destination.as_ref().display(),
            mode = ?mode
        )
    )]
    pub fn scaffold(
        &self,
        blueprint: &Blueprint,
        raw: &RawOptions,
        destination: impl AsRef<Path>,
        mode: ExecutionMode,
    ) -> TrellisResult<ExecutionReport> {
        let config = self.resolve(blueprint, raw)?;
        info!(
            app_name = config.app_name(),
            source = %self.source.location(),
            "Scaffolding Rails application"
        );
        self.execute(blueprint, &config, destination.as_ref(), mode)
    }

    /// Run a blueprint for an already-resolved configuration.
    pub fn execute(
        &self,
        blueprint: &Blueprint,
        config: &Configuration,
        destination: &Path,
        mode: ExecutionMode,
    ) -> TrellisResult<ExecutionReport> {
        let report = match mode {
            ExecutionMode::Direct => {
                self.filesystem.create_dir_all(destination)?;
                self.executor().execute(blueprint.pipeline(), config, destination)?
            }
            ExecutionMode::Staged => self.execute_staged(blueprint, config, destination)?,
        };

        info!(
            applied = report.applied_count(),
            skipped = report.skipped_count(),
            "Scaffold completed successfully"
        );
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn executor(&self) -> PipelineExecutor<'_> {
        PipelineExecutor::new(
            self.source.as_ref(),
            self.renderer.as_ref(),
            self.filesystem.as_ref(),
            self.runner.as_ref(),
        )
    }

    fn execute_staged(
        &self,
        blueprint: &Blueprint,
        config: &Configuration,
        destination: &Path,
    ) -> TrellisResult<ExecutionReport> {
        let staging = sibling_path(destination, "trellis-staging")?;
        info!(staging = %staging.display(), "Preparing staging directory");

        if let Err(e) = self.seed_staging(destination, &staging) {
            self.discard(&staging);
            return Err(e);
        }

        let report = match self.executor().execute(blueprint.pipeline(), config, &staging) {
            Ok(report) => report,
            Err(e) => {
                warn!("Pipeline failed, discarding staging directory");
                self.discard(&staging);
                return Err(e);
            }
        };

        if let Err(e) = self.swap_into_place(&staging, destination) {
            self.discard(&staging);
            return Err(e);
        }
        Ok(report.relocate(destination))
    }

    /// Copy the existing destination (if any) into a fresh staging directory.
    fn seed_staging(&self, destination: &Path, staging: &Path) -> TrellisResult<()> {
        self.filesystem
            .create_dir_all(staging)
            .map_err(|e| staging_failed(staging, e))?;

        if !self.filesystem.exists(destination) {
            return Ok(());
        }
        self.filesystem
            .copy_tree(destination, staging)
            .map_err(|e| staging_failed(destination, e))
    }

    /// Move the old destination aside, move staging in, then drop the old
    /// copy. The old copy is moved back if staging cannot take its place.
    fn swap_into_place(&self, staging: &Path, destination: &Path) -> TrellisResult<()> {
        if !self.filesystem.exists(destination) {
            self.filesystem
                .rename(staging, destination)
                .map_err(|e| staging_failed(destination, e))?;
            info!("Staged tree moved into place");
            return Ok(());
        }

        let previous = sibling_path(destination, "trellis-previous")?;
        self.filesystem
            .rename(destination, &previous)
            .map_err(|e| staging_failed(destination, e))?;

        if let Err(e) = self.filesystem.rename(staging, destination) {
            return Err(match self.filesystem.rename(&previous, destination) {
                Ok(()) => staging_failed(destination, e),
                Err(restore) => {
                    warn!(
                        previous = %previous.display(),
                        "Could not move the previous destination back"
                    );
                    ApplicationError::SwapIncomplete {
                        destination: destination.to_path_buf(),
                        previous,
                        reason: format!("{}; moving it back failed: {}", e, restore),
                    }
                    .into()
                }
            });
        }

        if let Err(e) = self.filesystem.remove_dir_all(&previous) {
            warn!(
                error = %e,
                path = %previous.display(),
                "Previous destination contents could not be removed"
            );
        }
        info!("Staged tree moved into place");
        Ok(())
    }

    /// Best-effort cleanup.
    fn discard(&self, staging: &Path) {
        if !self.filesystem.exists(staging) {
            return;
        }
        if let Err(e) = self.filesystem.remove_dir_all(staging) {
            warn!(
                error = %e,
                path = %staging.display(),
                "Staging cleanup failed"
            );
        }
    }
}

/// `.<name>.<purpose>-<uuid>` next to the destination.
fn sibling_path(destination: &Path, purpose: &str) -> TrellisResult<PathBuf> {
    let name = destination
        .file_name()
        .ok_or_else(|| ApplicationError::StagingFailed {
            path: destination.to_path_buf(),
            reason: "destination has no directory name".into(),
        })?
        .to_string_lossy();
    let parent = destination.parent().unwrap_or_else(|| Path::new(""));
    Ok(parent.join(format!(".{}.{}-{}", name, purpose, Uuid::new_v4())))
}

fn staging_failed(path: &Path, cause: crate::error::TrellisError) -> crate::error::TrellisError {
    ApplicationError::StagingFailed {
        path: path.to_path_buf(),
        reason: cause.to_string(),
    }
    .into()
}
