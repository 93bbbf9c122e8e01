//! `trellis init`: write a default configuration file.

use std::path::PathBuf;

use crate::{
    cli::InitArgs,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

const HEADER: &str = "\
# Trellis configuration.
#
# [defaults] are the lowest-priority scaffold options: an --options file
# and command-line flags override them.
";

/// Create a default Trellis configuration file.
pub fn execute(args: InitArgs, output: OutputManager) -> CliResult<()> {
    let config_path = target_path(&args);

    if config_path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {}  (use --force to overwrite)",
            config_path.display(),
        ))?;
        return Ok(());
    }

    let contents = render_default()?;

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_cli_context(|| {
            format!("Failed to create config directory '{}'", parent.display())
        })?;
    }

    std::fs::write(&config_path, contents)
        .with_cli_context(|| format!("Failed to write config to '{}'", config_path.display()))?;

    output.success(&format!("Configuration created at {}", config_path.display()))?;
    Ok(())
}

fn target_path(args: &InitArgs) -> PathBuf {
    if args.local {
        AppConfig::local_path().to_path_buf()
    } else {
        AppConfig::config_path()
    }
}

fn render_default() -> CliResult<String> {
    let body = toml::to_string_pretty(&AppConfig::default()).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise default config: {e}"),
        source: Some(Box::new(e)),
    })?;
    Ok(format!("{HEADER}\n{body}"))
}
