//! `trellis steps`: show the pipeline, optionally evaluated for options.

use tracing::instrument;

use trellis_adapters::builtin_blueprints;
use trellis_core::{
    domain::{PlannedStep, RawOptions, options as keys},
    error::TrellisError,
};

use crate::{
    cli::StepsArgs,
    commands::options::{self, PLACEHOLDER_APP_NAME},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Without option flags every step is listed with its guard.  With flags
/// the options are validated and each step is marked `+` (runs) or `-`
/// (skipped).
#[instrument(skip_all)]
pub fn execute(args: StepsArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let blueprint = builtin_blueprints::rails_blueprint()?;

    if args.options.is_empty() {
        if !output.is_json() {
            output.header(&format!("{} ({} steps)", blueprint.id(), blueprint.pipeline().len()))?;
        }
        return output.plan(&blueprint.pipeline().outline());
    }

    let raw = options::collect(&args.options, &config, None)?;
    let plan = evaluate(&blueprint, with_placeholder_name(raw))?;

    if !output.is_json() {
        let running = plan.iter().filter(|s| s.will_run == Some(true)).count();
        output.header(&format!("{} ({running} of {} steps run)", blueprint.id(), plan.len()))?;
    }
    output.plan(&plan)
}

fn evaluate(
    blueprint: &trellis_core::domain::Blueprint,
    raw: RawOptions,
) -> Result<Vec<PlannedStep>, TrellisError> {
    let config = blueprint.resolver().resolve(&raw)?;
    Ok(blueprint.pipeline().plan(&config))
}

/// The name never changes which steps run, so any valid one will do.
fn with_placeholder_name(mut raw: RawOptions) -> RawOptions {
    if raw.get(keys::APP_NAME).is_none() {
        raw.insert(keys::APP_NAME, PLACEHOLDER_APP_NAME);
    }
    raw
}
