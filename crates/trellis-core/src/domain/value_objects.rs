//! Domain value objects: Backend, Environment, Feature.
//!
//! These are pure value types: `Copy`, equality-by-value, no identity. Each
//! one knows its string form and how to parse itself.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Backend ──────────────────────────────────────────────────────────────────

/// A supported database backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sqlite3,
    Mysql,
    Postgresql,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Self::Sqlite3, Self::Mysql, Self::Postgresql];

    /// Canonical selector, as accepted on the command line.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite3 => "sqlite3",
            Self::Mysql => "mysql",
            Self::Postgresql => "postgresql",
        }
    }

    /// Driver identifier: the gem providing the database adapter.
    pub const fn driver(&self) -> &'static str {
        match self {
            Self::Sqlite3 => "sqlite3",
            Self::Mysql => "mysql2",
            Self::Postgresql => "pg",
        }
    }

    /// Connection URL for one environment of one application.
    pub fn database_url(&self, app_name: &str, environment: Environment) -> String {
        match self {
            Self::Sqlite3 => format!("sqlite3:db/{}.sqlite3", environment),
            Self::Mysql => format!("mysql2://root@localhost/{}_{}", app_name, environment),
            Self::Postgresql => format!("postgres:///{}_{}", app_name, environment),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sqlite3" => Ok(Self::Sqlite3),
            "mysql" => Ok(Self::Mysql),
            "postgresql" | "postgres" => Ok(Self::Postgresql),
            _ => Err(DomainError::UnsupportedBackend {
                value: s.to_string(),
            }),
        }
    }
}

// ── Environment ──────────────────────────────────────────────────────────────

/// A Rails runtime environment that gets its own database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Test,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Self::Development, Self::Test];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Feature ──────────────────────────────────────────────────────────────────

/// A boolean toggle a caller can set on the generated application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    SkipActiveRecord,
    SkipTestUnit,
    SkipJavascript,
    SkipActionCable,
    Edge,
    Dev,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Self::SkipActiveRecord,
        Self::SkipTestUnit,
        Self::SkipJavascript,
        Self::SkipActionCable,
        Self::Edge,
        Self::Dev,
    ];

    /// Raw option key carrying this toggle.
    pub const fn option_name(&self) -> &'static str {
        match self {
            Self::SkipActiveRecord => "skip_active_record",
            Self::SkipTestUnit => "skip_test_unit",
            Self::SkipJavascript => "skip_javascript",
            Self::SkipActionCable => "skip_action_cable",
            Self::Edge => "edge",
            Self::Dev => "dev",
        }
    }

    pub fn from_option_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.option_name() == name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_name())
    }
}
