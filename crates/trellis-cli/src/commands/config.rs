//! `trellis config`: inspect configuration values.

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(
    cmd: ConfigCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(&config, &key)?;
            output.print(&format!("{key} = {value}"))?;
        }

        ConfigCommands::List => {
            if output.is_json() {
                return output.json(&config);
            }
            output.header("Current Configuration:")?;
            let serialised =
                toml::to_string_pretty(&config).map_err(|e| CliError::ConfigError {
                    message: format!("Failed to serialise config: {e}"),
                    source: Some(Box::new(e)),
                })?;
            output.print(&serialised)?;
        }

        ConfigCommands::Path => {
            // The user-level location is shown even before it exists.
            let sources = AppConfig::sources(global.config.as_ref());
            for (index, (path, required)) in sources.into_iter().enumerate() {
                if index == 0 || required || path.exists() {
                    output.print(&path.display().to_string())?;
                }
            }
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    let unset = || String::from("(unset)");
    match key {
        "defaults.database" => Ok(config.defaults.database.clone().unwrap_or_else(unset)),
        "defaults.skip_test_unit" => Ok(config.defaults.skip_test_unit.to_string()),
        "defaults.skip_javascript" => Ok(config.defaults.skip_javascript.to_string()),
        "defaults.skip_action_cable" => Ok(config.defaults.skip_action_cable.to_string()),
        "output.no_color" => Ok(config.output.no_color.to_string()),
        "output.staged" => Ok(config.output.staged.to_string()),
        "templates.local_path" => Ok(config
            .templates
            .local_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(unset)),
        _ => Err(CliError::ConfigError {
            message: format!("Unknown config key: '{key}'"),
            source: None,
        }),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn get_known_key() {
        let mut cfg = AppConfig::default();
        cfg.defaults.database = Some("postgresql".into());
        assert_eq!(get_config_value(&cfg, "defaults.database").unwrap(), "postgresql");
    }

    #[test]
    fn unset_values_read_as_unset() {
        let cfg = AppConfig::default();
        assert_eq!(get_config_value(&cfg, "defaults.database").unwrap(), "(unset)");
        assert_eq!(get_config_value(&cfg, "templates.local_path").unwrap(), "(unset)");
    }

    #[test]
    fn get_unknown_key_is_error() {
        let cfg = AppConfig::default();
        assert!(matches!(
            get_config_value(&cfg, "does.not.exist"),
            Err(CliError::ConfigError { .. })
        ));
    }

    #[test]
    fn get_no_color_default() {
        let cfg = AppConfig::default();
        assert_eq!(get_config_value(&cfg, "output.no_color").unwrap(), "false");
    }
}
