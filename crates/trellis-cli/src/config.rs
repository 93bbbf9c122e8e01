//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `TRELLIS_` prefix, `__` between sections,
//!    e.g. `TRELLIS_DEFAULTS__DATABASE=postgresql`
//! 3. Config files: `--config FILE` alone, else `.trellis.toml` in the
//!    current directory over [`AppConfig::config_path`]
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use trellis_core::domain::RawOptions;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default scaffold options, below `--options` files and flags.
    pub defaults: Defaults,
    /// Output settings.
    pub output: OutputConfig,
    /// Template settings.
    pub templates: TemplateConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub database: Option<String>,
    pub skip_test_unit: bool,
    pub skip_javascript: bool,
    pub skip_action_cable: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// Always build in a staging directory, as if `--staged` were given.
    pub staged: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory to read template files from instead of the built-in copy.
    pub local_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration, layering files and environment over the defaults.
    ///
    /// An explicit `config_file` must exist and replaces both default
    /// locations; those are optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        Self::load_from(&Self::sources(config_file))
    }

    /// Config files read by [`Self::load`], lowest priority first, each
    /// paired with whether it must exist.
    pub fn sources(config_file: Option<&PathBuf>) -> Vec<(PathBuf, bool)> {
        match config_file {
            Some(path) => vec![(path.clone(), true)],
            None => vec![
                (Self::config_path(), false),
                (Self::local_path().to_path_buf(), false),
            ],
        }
    }

    fn load_from(files: &[(PathBuf, bool)]) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to serialise built-in defaults")?;

        let mut builder = Config::builder().add_source(defaults);
        for (path, required) in files {
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(*required),
            );
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("TRELLIS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration values")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.trellis.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "trellis", "trellis")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| Self::local_path().to_path_buf())
    }

    /// Per-project configuration file in the current directory.
    pub fn local_path() -> &'static Path {
        Path::new(".trellis.toml")
    }

    /// The `[defaults]` section as raw scaffold options.
    ///
    /// Toggles left at `false` are omitted so they never mask a value from
    /// an options file.
    pub fn default_options(&self) -> RawOptions {
        let mut raw = RawOptions::new();
        if let Some(database) = &self.defaults.database {
            raw.insert("database", database.as_str());
        }
        for (key, enabled) in [
            ("skip_test_unit", self.defaults.skip_test_unit),
            ("skip_javascript", self.defaults.skip_javascript),
            ("skip_action_cable", self.defaults.skip_action_cable),
        ] {
            if enabled {
                raw.insert(key, true);
            }
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_have_no_database() {
        let cfg = AppConfig::default();
        assert!(cfg.defaults.database.is_none());
        assert!(cfg.default_options().is_empty());
    }

    #[test]
    fn default_no_color_is_false() {
        assert!(!AppConfig::default().output.no_color);
    }

    #[test]
    fn explicit_file_is_layered_over_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trellis.toml");
        fs::write(
            &path,
            "[defaults]\ndatabase = \"postgresql\"\nskip_test_unit = true\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();

        assert_eq!(cfg.defaults.database.as_deref(), Some("postgresql"));
        let raw = cfg.default_options();
        assert_eq!(raw.text("database"), Some("postgresql"));
        assert_eq!(raw.get("skip_test_unit"), Some(&serde_json::Value::Bool(true)));
        assert_eq!(raw.get("skip_javascript"), None);
    }

    #[test]
    fn local_file_overrides_user_file() {
        let dir = TempDir::new().unwrap();
        let user = dir.path().join("config.toml");
        let local = dir.path().join(".trellis.toml");
        fs::write(
            &user,
            "[defaults]\ndatabase = \"mysql\"\nskip_javascript = true\n",
        )
        .unwrap();
        fs::write(&local, "[defaults]\ndatabase = \"postgresql\"\n").unwrap();

        let cfg = AppConfig::load_from(&[(user, false), (local, false)]).unwrap();

        assert_eq!(cfg.defaults.database.as_deref(), Some("postgresql"));
        assert!(cfg.defaults.skip_javascript);
    }

    #[test]
    fn absent_optional_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let cfg = AppConfig::load_from(&[(dir.path().join("absent.toml"), false)]).unwrap();
        assert!(cfg.defaults.database.is_none());
    }

    #[test]
    fn explicit_file_replaces_default_locations() {
        let path = PathBuf::from("custom.toml");
        assert_eq!(AppConfig::sources(Some(&path)), vec![(path.clone(), true)]);

        let defaults = AppConfig::sources(None);
        assert_eq!(defaults.len(), 2);
        assert_eq!(defaults[1].0, PathBuf::from(".trellis.toml"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn config_path_is_not_empty() {
        let p = AppConfig::config_path();
        assert!(!p.as_os_str().is_empty());
    }
}
