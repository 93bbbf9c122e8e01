//! Raw options, the typed [`Configuration`] they resolve into, and the
//! [`Bindings`] handed to the template renderer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::value_objects::{Backend, Environment, Feature};

/// Raw option keys that are not feature toggles.
pub mod options {
    use crate::domain::value_objects::Feature;

    pub const APP_NAME: &str = "app_name";
    pub const DATABASE: &str = "database";

    /// Every recognized raw option key, in documentation order.
    pub fn recognized() -> impl Iterator<Item = &'static str> {
        [APP_NAME, DATABASE]
            .into_iter()
            .chain(Feature::ALL.into_iter().map(|f| f.option_name()))
    }

    pub fn is_recognized(key: &str) -> bool {
        recognized().any(|k| k == key)
    }
}

// ── RawOptions ───────────────────────────────────────────────────────────────

/// Untyped option map as supplied by a caller (CLI flags, option files).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawOptions(BTreeMap<String, Value>);

impl RawOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Layer `overrides` on top of `self`; keys in `overrides` win.
    pub fn merged_with(mut self, overrides: RawOptions) -> Self {
        self.0.extend(overrides.0);
        self
    }

    /// Parse a JSON object.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Flag value; absent or non-boolean reads as `false`.
    pub fn flag(&self, feature: Feature) -> bool {
        self.get(feature.option_name())
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// String value, if present and a string.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}

impl FromIterator<(String, Value)> for RawOptions {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ── Configuration ────────────────────────────────────────────────────────────

/// Typed, validated options. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    app_name: String,
    database: Option<Backend>,
    features: BTreeSet<Feature>,
    environments: Vec<Environment>,
    derived: DerivedContext,
}

impl Configuration {
    /// Assemble a configuration and compute its derived context.
    ///
    /// Only the resolver calls this; it has already validated every input.
    /// When `skip_active_record` is enabled the backend is dropped.
    pub(crate) fn assemble(
        app_name: String,
        database: Option<Backend>,
        features: BTreeSet<Feature>,
    ) -> Self {
        let database = if features.contains(&Feature::SkipActiveRecord) {
            None
        } else {
            database
        };
        let environments = Environment::ALL.to_vec();
        let derived = DerivedContext::compute(&app_name, database, &environments);

        Self {
            app_name,
            database,
            features,
            environments,
            derived,
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// The storage backend, or `None` when storage is skipped.
    pub fn database(&self) -> Option<Backend> {
        self.database
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn enabled_features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features.iter().copied()
    }

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    pub fn derived(&self) -> &DerivedContext {
        &self.derived
    }

    /// Render variables for this configuration.
    pub fn bindings(&self) -> Bindings {
        Bindings::from(self)
    }
}

// ── DerivedContext ───────────────────────────────────────────────────────────

/// Values computed from a configuration once, at resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedContext {
    app_const: String,
    database_adapter: Option<&'static str>,
    database_urls: BTreeMap<Environment, String>,
    postgresql: bool,
}

impl DerivedContext {
    fn compute(app_name: &str, database: Option<Backend>, environments: &[Environment]) -> Self {
        let database_urls = match database {
            Some(backend) => environments
                .iter()
                .map(|env| (*env, backend.database_url(app_name, *env)))
                .collect(),
            None => BTreeMap::new(),
        };

        Self {
            app_const: camelize(app_name),
            database_adapter: database.map(|b| b.driver()),
            database_urls,
            postgresql: database == Some(Backend::Postgresql),
        }
    }

    pub fn app_const(&self) -> &str {
        &self.app_const
    }

    pub fn database_adapter(&self) -> Option<&'static str> {
        self.database_adapter
    }

    pub fn database_url(&self, environment: Environment) -> Option<&str> {
        self.database_urls.get(&environment).map(String::as_str)
    }

    pub fn database_urls(&self) -> &BTreeMap<Environment, String> {
        &self.database_urls
    }

    pub fn postgresql(&self) -> bool {
        self.postgresql
    }
}

/// `my_app`, `my-app` → `MyApp`.
pub fn camelize(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

// ── Bindings ─────────────────────────────────────────────────────────────────

/// Variables visible to templates: every configuration field plus every
/// derived field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Bindings(Map<String, Value>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<&Configuration> for Bindings {
    fn from(config: &Configuration) -> Self {
        let derived = config.derived();
        let urls: Map<String, Value> = derived
            .database_urls()
            .iter()
            .map(|(env, url)| (env.to_string(), Value::from(url.as_str())))
            .collect();

        let mut bindings = Bindings::new()
            .with(options::APP_NAME, config.app_name())
            .with(
                options::DATABASE,
                config.database().map(|b| b.as_str()),
            )
            .with(
                "environments",
                config
                    .environments()
                    .iter()
                    .map(|e| e.as_str())
                    .collect::<Vec<_>>(),
            )
            .with("app_const", derived.app_const())
            .with("database_adapter", derived.database_adapter())
            .with("database_urls", Value::Object(urls))
            .with("postgresql", derived.postgresql());

        for feature in Feature::ALL {
            bindings = bindings.with(feature.option_name(), config.is_enabled(feature));
        }
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(database: Option<Backend>, features: &[Feature]) -> Configuration {
        Configuration::assemble(
            "acme".into(),
            database,
            features.iter().copied().collect(),
        )
    }

    #[test]
    fn camelize_handles_separators() {
        assert_eq!(camelize("acme"), "Acme");
        assert_eq!(camelize("my_app"), "MyApp");
        assert_eq!(camelize("my-app"), "MyApp");
        assert_eq!(camelize("my__app_v2"), "MyAppV2");
    }

    #[test]
    fn derived_context_for_postgresql() {
        let config = config(Some(Backend::Postgresql), &[]);
        let derived = config.derived();
        assert_eq!(derived.app_const(), "Acme");
        assert_eq!(derived.database_adapter(), Some("pg"));
        assert!(derived.postgresql());
        assert_eq!(
            derived.database_url(Environment::Test),
            Some("postgres:///acme_test")
        );
        assert_eq!(
            derived.database_url(Environment::Development),
            Some("postgres:///acme_development")
        );
    }

    #[test]
    fn skipped_storage_has_empty_database_context() {
        let config = config(Some(Backend::Postgresql), &[Feature::SkipActiveRecord]);
        assert_eq!(config.database(), None);
        assert!(config.derived().database_urls().is_empty());
        assert_eq!(config.derived().database_adapter(), None);
        assert!(!config.derived().postgresql());
    }

    #[test]
    fn bindings_expose_every_field() {
        let bindings = config(Some(Backend::Mysql), &[Feature::Edge]).bindings();

        assert_eq!(bindings.get("app_name"), Some(&Value::from("acme")));
        assert_eq!(bindings.get("app_const"), Some(&Value::from("Acme")));
        assert_eq!(bindings.get("database"), Some(&Value::from("mysql")));
        assert_eq!(bindings.get("database_adapter"), Some(&Value::from("mysql2")));
        assert_eq!(bindings.get("edge"), Some(&Value::Bool(true)));
        assert_eq!(bindings.get("dev"), Some(&Value::Bool(false)));
        assert_eq!(
            bindings.get("database_urls").and_then(|v| v.get("test")),
            Some(&Value::from("mysql2://root@localhost/acme_test"))
        );
        for feature in Feature::ALL {
            assert!(bindings.contains(feature.option_name()));
        }
    }

    #[test]
    fn raw_options_merge_prefers_overrides() {
        let base = RawOptions::new()
            .with("database", "sqlite3")
            .with("edge", true);
        let merged = base.merged_with(RawOptions::new().with("database", "postgresql"));

        assert_eq!(merged.text("database"), Some("postgresql"));
        assert!(merged.flag(Feature::Edge));
        assert!(!merged.flag(Feature::Dev));
    }

    #[test]
    fn raw_options_parse_from_json() {
        let raw = RawOptions::from_json_str(r#"{"app_name": "acme", "skip_test_unit": true}"#)
            .unwrap();
        assert_eq!(raw.text("app_name"), Some("acme"));
        assert!(raw.flag(Feature::SkipTestUnit));
        assert!(RawOptions::from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn recognized_option_keys() {
        assert!(options::is_recognized("app_name"));
        assert!(options::is_recognized("skip_action_cable"));
        assert!(!options::is_recognized("skip_everything"));
        assert_eq!(options::recognized().count(), 8);
    }
}
