//! Implementation of the `trellis new` command.
//!
//! Responsibility: turn CLI arguments into raw options and adapters, call
//! the core scaffold service, and display results.  No business logic
//! lives here.

use std::path::Path;

use tracing::{info, instrument, warn};

use trellis_adapters::{
    DirectoryTemplateSource, EmbeddedTemplateSource, LocalFilesystem, MiniJinjaRenderer,
    ProcessCommandRunner, SkippingCommandRunner, builtin_blueprints,
};
use trellis_core::{
    application::{CommandRunner, ExecutionMode, ScaffoldService, TemplateSource},
    error::{ErrorCategory, TrellisError},
};

use crate::{
    cli::{NewArgs, global::GlobalArgs},
    commands::options,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `trellis new` command.
///
/// 1. Assemble raw options (config < options file < flags)
/// 2. Pick adapters
/// 3. Early-exit with the plan if `--dry-run`
/// 4. Execute the pipeline via `ScaffoldService`
/// 5. Print the summary
#[instrument(skip_all, fields(destination = %args.destination.display()))]
pub fn execute(
    args: NewArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let blueprint = builtin_blueprints::rails_blueprint()?;
    let destination = options::absolute(&args.destination)?;
    let raw = options::collect(&args.options, &config, Some(&destination))?;
    let service = build_service(&args, &config)?;

    if args.dry_run {
        let plan = service.plan(&blueprint, &raw)?;
        if !output.is_json() {
            output.header(&format!(
                "Dry run: {} into {}",
                blueprint.id(),
                destination.display()
            ))?;
        }
        output.plan(&plan)?;
        if !output.is_json() {
            let running = plan.iter().filter(|s| s.will_run == Some(true)).count();
            output.info(&format!("{running} of {} steps would run", plan.len()))?;
        }
        return Ok(());
    }

    let mode = if args.staged || config.output.staged {
        ExecutionMode::Staged
    } else {
        ExecutionMode::Direct
    };

    if !output.is_json() {
        output.header(&format!("Creating {}...", destination.display()))?;
    }
    info!(mode = ?mode, "Scaffold started");

    let report = match service.scaffold(&blueprint, &raw, &destination, mode) {
        Ok(report) => report,
        Err(e) => {
            warn_partial_output(&e, mode, &destination, &output)?;
            return Err(CliError::Core(e));
        }
    };

    output.report(&report, global.verbose > 0)?;

    if !output.is_json() && !output.is_quiet() {
        output.print("")?;
        output.print("Next steps:")?;
        output.print(&format!("  cd {}", args.destination.display()))?;
        if args.skip_commands {
            output.print("  bundle install")?;
        }
        output.print("  bin/rails server")?;
    }

    Ok(())
}

// ── Adapters ──────────────────────────────────────────────────────────────────

fn build_service(args: &NewArgs, config: &AppConfig) -> CliResult<ScaffoldService> {
    let template_dir = args
        .template_dir
        .as_ref()
        .or(config.templates.local_path.as_ref());

    let source: Box<dyn TemplateSource> = match template_dir {
        Some(dir) => {
            if !dir.is_dir() {
                return Err(CliError::InvalidInput {
                    message: format!("template directory '{}' does not exist", dir.display()),
                    source: None,
                });
            }
            Box::new(DirectoryTemplateSource::new(dir))
        }
        None => Box::new(EmbeddedTemplateSource::rails()),
    };

    let runner: Box<dyn CommandRunner> = if args.skip_commands {
        Box::new(SkippingCommandRunner::new())
    } else {
        Box::new(ProcessCommandRunner::new())
    };

    Ok(ScaffoldService::new(
        source,
        Box::new(MiniJinjaRenderer::new()),
        Box::new(LocalFilesystem::new()),
        runner,
    ))
}

/// Direct runs have no rollback; say so when a step fails midway.
fn warn_partial_output(
    err: &TrellisError,
    mode: ExecutionMode,
    destination: &Path,
    output: &OutputManager,
) -> CliResult<()> {
    if mode != ExecutionMode::Direct || err.category() != ErrorCategory::Execution {
        return Ok(());
    }
    warn!(step = err.failed_step().unwrap_or("unknown"), "Direct run failed midway");
    output.warning(&format!(
        "{} may contain partial output; re-run with --staged to keep it untouched on failure",
        destination.display()
    ))?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
