use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::SqlHooksError;

/// A single column value or statement parameter.
///
/// Both backends bind and read through this enum, so an interceptor can look
/// at or rewrite [`Scope::params`](crate::callbacks::Scope::params) without
/// knowing which driver sits underneath:
/// ```rust
/// use sql_hooks::prelude::*;
///
/// let mut scope = Scope::detached(
///     Operation::Create,
///     "INSERT INTO users (id, name) VALUES (?1, ?2)",
///     vec![RowValues::Int(1), RowValues::Text("alice".into())],
/// );
/// scope.params_mut().push(RowValues::Bool(true));
/// assert_eq!(scope.params()[1].as_text(), Some("alice"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    Int(i64),
    Float(f64),
    Text(String),
    /// Stored as 0/1 by `SQLite`.
    Bool(bool),
    /// Naive UTC timestamp; `SQLite` stores it as text.
    Timestamp(NaiveDateTime),
    Null,
    /// `SQLite` stores it as text; `PostgreSQL` binds it to JSON/JSONB.
    JSON(JsonValue),
    Blob(Vec<u8>),
}

impl RowValues {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        match self {
            Self::Int(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// `SQLite` hands booleans back as 0/1 integers; those read as `bool` too.
    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        match self {
            Self::Bool(value) => Some(value),
            Self::Int(0) => Some(&false),
            Self::Int(1) => Some(&true),
            _ => None,
        }
    }

    /// Also parses `SQLite`'s text form (`%Y-%m-%d %H:%M:%S`, optional
    /// fraction).
    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Timestamp(value) => Some(*value),
            Self::Text(text) => NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// The SQL dialects a [`Db`](crate::db::Db) can be opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    Postgres,
    Sqlite,
}

impl DatabaseType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DatabaseType::Postgres => "postgres",
            DatabaseType::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseType {
    type Err = SqlHooksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DatabaseType::Postgres),
            "sqlite" | "sqlite3" => Ok(DatabaseType::Sqlite),
            other => Err(SqlHooksError::ConfigError(format!(
                "unsupported dialect: {other:?}"
            ))),
        }
    }
}
