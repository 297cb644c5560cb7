use serde::{Deserialize, Serialize};

use super::ConfigError;

/// `[database]` section, selected by its `type` key.
///
/// SQLite is the only backend. The tag is kept so a file written today stays
/// valid if another backend is added.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum DatabaseConfig {
    Sqlite(SqliteConfig),
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig::Sqlite(SqliteConfig::default())
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let DatabaseConfig::Sqlite(sqlite) = self;
        sqlite.validate()
    }

    /// Whether `serve` and `create-admin` migrate the schema before starting.
    pub fn run_migrations(&self) -> bool {
        let DatabaseConfig::Sqlite(sqlite) = self;
        sqlite.run_migrations
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SqliteConfig {
    /// Database file. `:memory:` gives a throwaway database per connection
    /// and is only useful in tests.
    pub path: String,
    pub create_if_missing: bool,
    pub run_migrations: bool,
    /// Write-ahead logging lets readers proceed during a write.
    pub wal_mode: bool,
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout_ms: u64,
    pub max_connections: u32,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: "lyceum.db".to_string(),
            create_if_missing: true,
            run_migrations: true,
            wal_mode: true,
            busy_timeout_ms: 5_000,
            max_connections: 5,
        }
    }
}

impl SqliteConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database.path must not be empty".into(),
            ));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
