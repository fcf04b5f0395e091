//! Application configuration.
//!
//! Loaded from a TOML file; every section is optional and falls back to its
//! defaults. A handful of `LITEFORGE_*` environment variables override the
//! file after loading.
//!
//! ```toml
//! base_url = "https://example.test"
//!
//! [database]
//! path = "app.db"
//!
//! [views]
//! root = "views"
//! layout = "main"
//!
//! [dispatch]
//! strict_actions = false
//!
//! [validation]
//! unknown_rules = "pass"
//!
//! [log]
//! level = "info"
//! ```

use crate::core::error::ConfigError;
use crate::validation::UnknownRulePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base for relative redirects.
    pub base_url: String,
    pub database: DatabaseConfig,
    pub views: ViewConfig,
    pub dispatch: DispatchConfig,
    pub validation: ValidationConfig,
    pub log: LogConfig,
}

/// Database location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path, or `:memory:`.
    pub path: String,
}

/// View lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Directory holding views; layouts live in `root/layouts`.
    pub root: PathBuf,
    /// File extension of view files, without the dot.
    pub extension: String,
    /// Default layout, if any.
    pub layout: Option<String>,
}

/// Dispatch behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Fail with `ActionNotFound` instead of skipping a missing action.
    pub strict_actions: bool,
}

/// Validation behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Outcome of rule kinds that are not registered.
    pub unknown_rules: UnknownRulePolicy,
}

/// Logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `env_logger` filter string, e.g. `info` or `liteforge=debug`.
    pub level: String,
    /// Prefix lines with timestamps.
    pub timestamps: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            database: DatabaseConfig::default(),
            views: ViewConfig::default(),
            dispatch: DispatchConfig::default(),
            validation: ValidationConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: ":memory:".to_string(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("views"),
            extension: "html".to_string(),
            layout: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timestamps: true,
        }
    }
}

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Load configuration from a file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `LITEFORGE_*` overrides from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LITEFORGE_BASE_URL") {
            self.base_url = url;
        }
        if let Some(path) = lookup("LITEFORGE_DATABASE") {
            self.database.path = path;
        }
        if let Some(root) = lookup("LITEFORGE_VIEWS") {
            self.views.root = PathBuf::from(root);
        }
        if let Some(level) = lookup("LITEFORGE_LOG") {
            self.log.level = level;
        }
        self.check()
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "database.path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.views.extension.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "views.extension".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
