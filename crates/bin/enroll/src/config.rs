//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `enroll.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Default acting principal.
    pub operator: OperatorConfig,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// The operator enrollments run as when none is given on the command line.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    /// Operator display name.
    pub name: String,
    /// Whether the operator may use administrator-only fields.
    pub admin: bool,
}

impl Config {
    /// Load configuration from `enroll.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("enroll.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ENROLL_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("ENROLL_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("ENROLL_OPERATOR") {
            self.operator.name = val;
        }
        if let Ok(val) = std::env::var("ENROLL_ADMIN") {
            self.operator.admin = matches!(val.as_str(), "1" | "true");
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.operator.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "operator name must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:enroll.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "enroll=info,operon_core=info,operon_adapter_txn_sqlite_sqlx=info".to_string(),
        }
    }
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            name: "ops".to_string(),
            admin: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
