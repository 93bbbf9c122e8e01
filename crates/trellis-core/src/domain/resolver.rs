//! Raw options → typed [`Configuration`].

use std::collections::BTreeSet;
use std::str::FromStr;

use tracing::{debug, instrument, warn};

use crate::domain::{
    entities::configuration::{Configuration, RawOptions, options},
    error::DomainError,
    validation::{ValidationRule, builtin_rules},
    value_objects::{Backend, Feature},
};

/// Validation gate in front of every run.
///
/// Evaluates the built-in rules followed by any extra (blueprint) rules. All
/// rules run; the first failure in declaration order is returned.
#[derive(Debug, Clone)]
pub struct ConfigurationResolver {
    rules: Vec<ValidationRule>,
}

impl ConfigurationResolver {
    pub fn new(extra_rules: &[ValidationRule]) -> Self {
        let mut rules = builtin_rules();
        rules.extend_from_slice(extra_rules);
        Self { rules }
    }

    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    /// Every failing rule, in declaration order.
    pub fn check(&self, raw: &RawOptions) -> Vec<DomainError> {
        self.rules
            .iter()
            .filter_map(|rule| rule.evaluate(raw).err())
            .collect()
    }

    #[instrument(skip_all, fields(options = raw.len(), rules = self.rules.len()))]
    pub fn resolve(&self, raw: &RawOptions) -> Result<Configuration, DomainError> {
        let failures = self.check(raw);
        if let Some(first) = failures.first() {
            for failure in &failures {
                warn!(%failure, "option validation failed");
            }
            return Err(first.clone());
        }

        let app_name = raw
            .text(options::APP_NAME)
            .ok_or(DomainError::MissingRequiredField {
                field: options::APP_NAME,
            })?
            .trim()
            .to_string();

        let database = match raw.text(options::DATABASE) {
            Some(db) if !db.trim().is_empty() => Some(Backend::from_str(db)?),
            _ => None,
        };

        let features: BTreeSet<Feature> = Feature::ALL
            .into_iter()
            .filter(|feature| raw.flag(*feature))
            .collect();

        let config = Configuration::assemble(app_name, database, features);
        debug!(
            app_name = config.app_name(),
            database = ?config.database(),
            "configuration resolved"
        );
        Ok(config)
    }
}

impl Default for ConfigurationResolver {
    fn default() -> Self {
        Self::new(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Environment;

    fn acme() -> RawOptions {
        RawOptions::new()
            .with("app_name", "acme")
            .with("database", "postgresql")
    }

    #[test]
    fn resolves_typed_configuration() {
        let config = ConfigurationResolver::default().resolve(&acme()).unwrap();
        assert_eq!(config.app_name(), "acme");
        assert_eq!(config.database(), Some(Backend::Postgresql));
        assert!(!config.is_enabled(Feature::SkipTestUnit));
        assert_eq!(
            config.derived().database_url(Environment::Test),
            Some("postgres:///acme_test")
        );
    }

    #[test]
    fn postgres_alias_resolves_to_postgresql() {
        let raw = acme().with("database", "postgres");
        let config = ConfigurationResolver::default().resolve(&raw).unwrap();
        assert_eq!(config.database(), Some(Backend::Postgresql));
        assert!(config.derived().postgresql());
    }

    #[test]
    fn returns_first_failure_in_declaration_order() {
        // Both app_name and database are wrong; app_name rules come first.
        let raw = RawOptions::new().with("database", "oracle");
        let resolver = ConfigurationResolver::default();

        let failures = resolver.check(&raw);
        assert_eq!(failures.len(), 2);

        match resolver.resolve(&raw) {
            Err(DomainError::ConfigValidation { rule, option, .. }) => {
                assert_eq!(rule, "app_name_present");
                assert_eq!(option, "app_name");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn oracle_is_unsupported() {
        let raw = acme().with("database", "oracle");
        assert_eq!(
            ConfigurationResolver::default().resolve(&raw),
            Err(DomainError::UnsupportedBackend {
                value: "oracle".into()
            })
        );
    }

    #[test]
    fn skip_active_record_needs_no_database() {
        let raw = RawOptions::new()
            .with("app_name", "acme")
            .with("skip_active_record", true);
        let config = ConfigurationResolver::default().resolve(&raw).unwrap();
        assert_eq!(config.database(), None);
        assert!(config.is_enabled(Feature::SkipActiveRecord));
    }

    #[test]
    fn extra_rules_run_after_builtins() {
        let resolver = ConfigurationResolver::new(&[ValidationRule::excludes(
            "edge_excludes_dev",
            Feature::Edge,
            Feature::Dev,
            "Choose either edge or dev",
        )]);
        let raw = acme().with("edge", true).with("dev", true);

        match resolver.resolve(&raw) {
            Err(DomainError::ConfigValidation { rule, .. }) => {
                assert_eq!(rule, "edge_excludes_dev")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn booleans_default_to_false() {
        let config = ConfigurationResolver::default().resolve(&acme()).unwrap();
        assert_eq!(config.enabled_features().count(), 0);
    }
}
