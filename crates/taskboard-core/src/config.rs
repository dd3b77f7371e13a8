use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::{TaskboardError, TaskboardResult};

pub const ENV_BIND: &str = "TASKBOARD_BIND";
pub const ENV_STORAGE: &str = "TASKBOARD_STORAGE";
pub const ENV_DATABASE: &str = "TASKBOARD_DATABASE";
pub const ENV_LOG: &str = "TASKBOARD_LOG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(TaskboardError::Config(format!(
                "unknown storage backend {:?} (expected \"memory\" or \"sqlite\")",
                other
            ))),
        }
    }
}

/// Bounded retry of operations that lost an optimistic concurrency race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_address: String,
    pub storage: StorageBackend,
    pub database_path: PathBuf,
    pub log_level: String,
    pub retry: RetryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8017".to_string(),
            storage: StorageBackend::Memory,
            database_path: PathBuf::from("taskboard.db"),
            log_level: "info".to_string(),
            retry: RetryConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/taskboard/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("taskboard/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("taskboard\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Load configuration from an explicit file, or from the platform config
    /// directory when none is given. A missing default file yields defaults;
    /// a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> TaskboardResult<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> TaskboardResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TaskboardError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| TaskboardError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `TASKBOARD_*` overrides using the given variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> TaskboardResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind_address = bind;
        }
        if let Some(storage) = lookup(ENV_STORAGE) {
            self.storage = storage.parse()?;
        }
        if let Some(database) = lookup(ENV_DATABASE) {
            self.database_path = PathBuf::from(database);
        }
        if let Some(level) = lookup(ENV_LOG) {
            self.log_level = level;
        }
        self.validate()
    }

    pub fn apply_env(&mut self) -> TaskboardResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn validate(&self) -> TaskboardResult<()> {
        if self.bind_address.trim().is_empty() {
            return Err(TaskboardError::Config("bind_address must not be empty".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(TaskboardError::Config(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.storage == StorageBackend::Sqlite && self.database_path.as_os_str().is_empty() {
            return Err(TaskboardError::Config(
                "database_path is required for the sqlite backend".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1:8017");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "storage = \"sqlite\"\ndatabase_path = \"/tmp/boards.db\"\n\n[retry]\nmax_attempts = 5\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.storage, StorageBackend::Sqlite);
        assert_eq!(config.database_path, PathBuf::from("/tmp/boards.db"));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.backoff_ms, 10);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempdir().unwrap();
        let result = AppConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(TaskboardError::Config(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[retry]\nmax_attempts = 0\n").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());

        std::fs::write(&path, "storage = \"mongo\"\n").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_BIND, "0.0.0.0:9000"),
            (ENV_STORAGE, "SQLite"),
            (ENV_DATABASE, "/var/lib/taskboard.db"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.storage, StorageBackend::Sqlite);
        assert_eq!(config.database_path, PathBuf::from("/var/lib/taskboard.db"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_bad_storage_override() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| (key == ENV_STORAGE).then(|| "redis".to_string()));
        assert!(result.is_err());
    }
}
