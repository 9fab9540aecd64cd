//! Store and mapper configuration.

use std::path::Path;

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};

use crate::error::{MapperError, MapperResult};

/// How column and table names are derived when none is declared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    /// `createdAt` -> `createdat`
    #[default]
    Lowercase,
    /// `createdAt` -> `created_at`
    SnakeCase,
}

impl NamingConvention {
    pub fn apply(&self, name: &str) -> String {
        match self {
            NamingConvention::Lowercase => name.to_lowercase(),
            NamingConvention::SnakeCase => name.to_case(Case::Snake),
        }
    }
}

/// Mapper configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapperConfig {
    #[serde(default)]
    pub naming: NamingConvention,
}

impl MapperConfig {
    pub fn with_naming(mut self, naming: NamingConvention) -> Self {
        self.naming = naming;
        self
    }
}

/// SQLite store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Path or `file:` URI of the SQLite database
    pub db_path: String,
    /// How long a connection waits on a locked database
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,
    /// Statements run once when the store is opened
    #[serde(default)]
    pub init_sql: Vec<String>,
}

impl SqliteConfig {
    /// Create a new SQLite config for the given path
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout_ms: None,
            init_sql: Vec::new(),
        }
    }

    /// A named in-memory database shared by every connection of the store.
    pub fn in_memory(name: &str) -> Self {
        Self::new(format!("file:{name}?mode=memory&cache=shared"))
    }

    pub fn with_busy_timeout_ms(mut self, ms: u64) -> Self {
        self.busy_timeout_ms = Some(ms);
        self
    }

    pub fn with_init_sql(mut self, sql: impl Into<String>) -> Self {
        self.init_sql.push(sql.into());
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path == ":memory:" || self.db_path.contains("mode=memory")
    }

    pub fn from_json(json: &str) -> MapperResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> MapperResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| MapperError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> MapperResult<()> {
        if self.db_path.trim().is_empty() {
            return Err(MapperError::Config("db_path must not be empty".into()));
        }
        // a private :memory: database would differ per connection
        if self.db_path == ":memory:" {
            return Err(MapperError::Config(
                "use SqliteConfig::in_memory for in-memory databases".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_is_the_default_convention() {
        assert_eq!(NamingConvention::default().apply("createdAt"), "createdat");
    }

    #[test]
    fn snake_case_splits_camel_humps() {
        assert_eq!(NamingConvention::SnakeCase.apply("createdAt"), "created_at");
        assert_eq!(NamingConvention::SnakeCase.apply("userId"), "user_id");
        assert_eq!(NamingConvention::SnakeCase.apply("name"), "name");
    }

    #[test]
    fn config_parses_from_json() {
        let config = SqliteConfig::from_json(
            r#"{ "db_path": "/tmp/app.db", "busy_timeout_ms": 250, "init_sql": ["PRAGMA foreign_keys = ON"] }"#,
        )
        .unwrap();
        assert_eq!(config.db_path, "/tmp/app.db");
        assert_eq!(config.busy_timeout_ms, Some(250));
        assert_eq!(config.init_sql.len(), 1);
    }

    #[test]
    fn optional_fields_default() {
        let config = SqliteConfig::from_json(r#"{ "db_path": "app.db" }"#).unwrap();
        assert_eq!(config, SqliteConfig::new("app.db"));
    }

    #[test]
    fn private_memory_path_is_rejected() {
        let err = SqliteConfig::from_json(r#"{ "db_path": ":memory:" }"#).unwrap_err();
        assert!(matches!(err, MapperError::Config(_)));
    }

    #[test]
    fn mapper_config_reads_naming() {
        let config: MapperConfig = serde_json::from_str(r#"{ "naming": "snake_case" }"#).unwrap();
        assert_eq!(config.naming, NamingConvention::SnakeCase);
        let config: MapperConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.naming, NamingConvention::Lowercase);
    }

    #[test]
    fn shared_memory_uri() {
        let config = SqliteConfig::in_memory("users");
        assert!(config.is_in_memory());
        assert!(config.validate().is_ok());
    }
}
