//! Assembling raw scaffold options from config, options files and flags.
//!
//! Layers, lowest first: the `[defaults]` config section, the `--options`
//! file, then explicit flags.  Nothing here validates values; that is the
//! resolver's job, so a bad `--database` still reaches it untouched.

use std::path::{Path, PathBuf};

use tracing::debug;
use trellis_core::domain::{Feature, RawOptions, options};

use crate::{
    cli::OptionArgs,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
};

/// Application name used by `trellis steps` when none is given.
pub const PLACEHOLDER_APP_NAME: &str = "app";

/// Merge every option layer.  When `destination` is given and no layer set
/// `app_name`, the destination directory's name is used.
pub fn collect(
    args: &OptionArgs,
    config: &AppConfig,
    destination: Option<&Path>,
) -> CliResult<RawOptions> {
    let mut raw = config.default_options();

    if let Some(path) = &args.options_file {
        raw = raw.merged_with(read_options_file(path)?);
    }
    raw = raw.merged_with(from_flags(args));

    if raw.get(options::APP_NAME).is_none() {
        if let Some(destination) = destination {
            raw.insert(options::APP_NAME, app_name_from(destination)?);
        }
    }

    debug!(keys = ?raw.keys().collect::<Vec<_>>(), "raw options assembled");
    Ok(raw)
}

/// JSON by default; TOML when the file ends in `.toml`.
pub fn read_options_file(path: &Path) -> CliResult<RawOptions> {
    let text = std::fs::read_to_string(path)
        .with_cli_context(|| format!("failed to read options file '{}'", path.display()))?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str::<RawOptions>(&text).map_err(|e| invalid_file(path, e))
    } else {
        RawOptions::from_json_str(&text).map_err(|e| invalid_file(path, e))
    }
}

fn invalid_file(path: &Path, e: impl std::error::Error + Send + Sync + 'static) -> CliError {
    CliError::InvalidInput {
        message: format!("options file '{}' is not a table of options: {e}", path.display()),
        source: Some(Box::new(e)),
    }
}

/// Only flags the user actually passed; unset toggles are left out so they
/// never mask a `true` from a lower layer.
fn from_flags(args: &OptionArgs) -> RawOptions {
    let mut raw = RawOptions::new();
    if let Some(name) = &args.app_name {
        raw.insert(options::APP_NAME, name.as_str());
    }
    if let Some(database) = &args.database {
        raw.insert(options::DATABASE, database.as_str());
    }
    for (feature, set) in [
        (Feature::SkipActiveRecord, args.skip_active_record),
        (Feature::SkipTestUnit, args.skip_test_unit),
        (Feature::SkipJavascript, args.skip_javascript),
        (Feature::SkipActionCable, args.skip_action_cable),
        (Feature::Edge, args.edge),
        (Feature::Dev, args.dev),
    ] {
        if set {
            raw.insert(feature.option_name(), true);
        }
    }
    raw
}

/// Absolute form of `path`, without touching the filesystem.
pub fn absolute(path: &Path) -> CliResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().with_cli_context(|| "failed to read current directory")?;
    Ok(cwd.join(path))
}

fn app_name_from(destination: &Path) -> CliResult<String> {
    let absolute = absolute(destination)?;
    absolute
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .ok_or_else(|| CliError::InvalidDestination {
            path: destination.to_path_buf(),
            reason: "cannot derive an application name from it".into(),
        })
}
