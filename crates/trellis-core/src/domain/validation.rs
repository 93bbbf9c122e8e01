//! Validation rules evaluated over raw options before anything is written.
//!
//! The built-in rules guard the options every blueprint understands. A
//! blueprint appends its own rules (requires / implies / excludes) after them.

use serde_json::Value;
use std::str::FromStr;

use crate::domain::{
    entities::configuration::{RawOptions, options},
    error::DomainError,
    value_objects::{Backend, Feature},
};

/// What a rule checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCheck {
    /// Every key is a recognized option.
    RecognizedKeys,
    /// `app_name` / `database` are strings, toggles are booleans.
    ValueTypes,
    AppNamePresent,
    AppNameFormat,
    /// `database` is given unless storage is skipped.
    DatabasePresent,
    DatabaseSupported,
    /// Hard precondition: the toggle must have exactly this value.
    Requires { feature: Feature, expected: bool },
    /// `when` enabled means `then` must be enabled too.
    Implies { when: Feature, then: Feature },
    /// The two toggles may not both be enabled.
    Excludes { first: Feature, second: Feature },
}

/// A named precondition over raw options.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRule {
    name: String,
    option: String,
    expected: String,
    message: String,
    check: RuleCheck,
}

impl ValidationRule {
    pub fn new(
        name: impl Into<String>,
        option: impl Into<String>,
        expected: impl Into<String>,
        message: impl Into<String>,
        check: RuleCheck,
    ) -> Self {
        Self {
            name: name.into(),
            option: option.into(),
            expected: expected.into(),
            message: message.into(),
            check,
        }
    }

    pub fn requires(
        name: impl Into<String>,
        feature: Feature,
        expected: bool,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            feature.option_name(),
            expected.to_string(),
            message,
            RuleCheck::Requires { feature, expected },
        )
    }

    pub fn implies(
        name: impl Into<String>,
        when: Feature,
        then: Feature,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            then.option_name(),
            format!("true when {} is set", when),
            message,
            RuleCheck::Implies { when, then },
        )
    }

    pub fn excludes(
        name: impl Into<String>,
        first: Feature,
        second: Feature,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            second.option_name(),
            format!("false when {} is set", first),
            message,
            RuleCheck::Excludes { first, second },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn option(&self) -> &str {
        &self.option
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn check(&self) -> RuleCheck {
        self.check
    }

    /// Evaluate against raw options.
    pub fn evaluate(&self, raw: &RawOptions) -> Result<(), DomainError> {
        match self.check {
            RuleCheck::RecognizedKeys => match raw.keys().find(|k| !options::is_recognized(k)) {
                Some(unknown) => Err(self.failure_at(unknown, format!("Unknown option '{}'", unknown))),
                None => Ok(()),
            },
            RuleCheck::ValueTypes => {
                for (key, value) in raw.iter() {
                    let expected = match key {
                        options::APP_NAME | options::DATABASE => {
                            if value.is_string() {
                                continue;
                            }
                            "a string"
                        }
                        _ if Feature::from_option_name(key).is_some() => {
                            if value.is_boolean() {
                                continue;
                            }
                            "a boolean"
                        }
                        _ => continue,
                    };
                    return Err(DomainError::ConfigValidation {
                        rule: self.name.clone(),
                        option: key.to_string(),
                        expected: expected.to_string(),
                        message: format!("Option '{}' has the wrong type ({})", key, type_name(value)),
                    });
                }
                Ok(())
            }
            RuleCheck::AppNamePresent => match raw.text(options::APP_NAME) {
                Some(name) if !name.trim().is_empty() => Ok(()),
                _ => Err(self.failure()),
            },
            RuleCheck::AppNameFormat => match raw.text(options::APP_NAME) {
                Some(name) if !name.trim().is_empty() && !is_valid_app_name(name) => {
                    Err(self.failure())
                }
                _ => Ok(()),
            },
            RuleCheck::DatabasePresent => {
                if raw.flag(Feature::SkipActiveRecord) {
                    return Ok(());
                }
                match raw.text(options::DATABASE) {
                    Some(db) if !db.trim().is_empty() => Ok(()),
                    _ => Err(self.failure()),
                }
            }
            RuleCheck::DatabaseSupported => match raw.text(options::DATABASE) {
                Some(db) if !db.trim().is_empty() => Backend::from_str(db).map(|_| ()),
                _ => Ok(()),
            },
            RuleCheck::Requires { feature, expected } => {
                if raw.flag(feature) == expected {
                    Ok(())
                } else {
                    Err(self.failure())
                }
            }
            RuleCheck::Implies { when, then } => {
                if !raw.flag(when) || raw.flag(then) {
                    Ok(())
                } else {
                    Err(self.failure())
                }
            }
            RuleCheck::Excludes { first, second } => {
                if raw.flag(first) && raw.flag(second) {
                    Err(self.failure())
                } else {
                    Ok(())
                }
            }
        }
    }

    fn failure(&self) -> DomainError {
        self.failure_at(&self.option, self.message.clone())
    }

    fn failure_at(&self, option: &str, message: String) -> DomainError {
        DomainError::ConfigValidation {
            rule: self.name.clone(),
            option: option.to_string(),
            expected: self.expected.clone(),
            message,
        }
    }
}

/// Rules every blueprint starts with, in evaluation order.
pub fn builtin_rules() -> Vec<ValidationRule> {
    vec![
        ValidationRule::new(
            "recognized_options",
            "*",
            "one of the recognized options",
            "Unknown option",
            RuleCheck::RecognizedKeys,
        ),
        ValidationRule::new(
            "option_types",
            "*",
            "a value of the option's type",
            "Option has the wrong type",
            RuleCheck::ValueTypes,
        ),
        ValidationRule::new(
            "app_name_present",
            options::APP_NAME,
            "a non-empty string",
            "An application name is required",
            RuleCheck::AppNamePresent,
        ),
        ValidationRule::new(
            "app_name_format",
            options::APP_NAME,
            "an ASCII letter followed by letters, digits, '_' or '-'",
            "The application name is not a valid identifier",
            RuleCheck::AppNameFormat,
        ),
        ValidationRule::new(
            "database_present",
            options::DATABASE,
            "one of sqlite3, mysql, postgresql",
            "A database backend is required unless skip_active_record is set",
            RuleCheck::DatabasePresent,
        ),
        ValidationRule::new(
            "database_supported",
            options::DATABASE,
            "one of sqlite3, mysql, postgresql",
            "Unsupported database backend",
            RuleCheck::DatabaseSupported,
        ),
    ]
}

fn is_valid_app_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
