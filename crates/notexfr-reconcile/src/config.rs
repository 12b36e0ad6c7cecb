//! Reconciliation configuration.
//!
//! Configuration can be loaded from:
//! - TOML files (default: ~/.config/notexfr/config.toml)
//! - Environment variables (NOTEXFR_* prefixed)
//!
//! # Example
//!
//! ```rust,no_run
//! use notexfr_reconcile::config::ReconcileConfig;
//!
//! // Load from default path or fall back to env vars
//! let config = ReconcileConfig::load().expect("Failed to load config");
//!
//! // Or explicitly from a file
//! let config = ReconcileConfig::from_file(std::path::Path::new("notexfr.toml")).expect("Failed to load");
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use notexfr_core::defaults;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: String, value: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for notexfr_core::Error {
    fn from(e: ConfigError) -> Self {
        notexfr_core::Error::Config(e.to_string())
    }
}

/// Tunables for reconciliation and conversion runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Prefix applied to synthesized notebook tags whose name collides with
    /// an existing target tag.
    pub conflict_prefix: String,
    /// Deadline for tag, note and notebook matching.
    pub match_timeout_secs: u64,
    /// Deadline for the note backfill.
    pub backfill_timeout_secs: u64,
    /// Deadline for conversions and ENEX dumps.
    pub convert_timeout_secs: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            conflict_prefix: defaults::CONFLICT_PREFIX.to_string(),
            match_timeout_secs: defaults::MATCH_TIMEOUT_SECS,
            backfill_timeout_secs: defaults::BACKFILL_TIMEOUT_SECS,
            convert_timeout_secs: defaults::CONVERT_TIMEOUT_SECS,
        }
    }
}

impl ReconcileConfig {
    /// Get the default config file path.
    ///
    /// Returns: ~/.config/notexfr/config.toml
    pub fn default_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push("notexfr");
        path.push("config.toml");
        path
    }

    /// Load configuration from the default path, falling back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_config_path();

        if path.exists() {
            info!("Loading notexfr config from: {}", path.display());
            Self::from_file(&path)
        } else {
            debug!(
                "Config file not found at {}, using environment variables",
                path.display()
            );
            Self::from_env()
        }
    }

    /// Load from `path` when given, otherwise as [`ReconcileConfig::load`].
    pub fn load_from(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a TOML file. Keys may sit at the top level or
    /// under a `[reconcile]` table; missing keys take their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let content = Self::substitute_env_vars(&content);

        #[derive(Deserialize)]
        struct TomlRoot {
            reconcile: Option<ReconcileConfig>,
            #[serde(flatten)]
            top_level: ReconcileConfig,
        }

        let root: TomlRoot = toml::from_str(&content)?;
        let config = root.reconcile.unwrap_or(root.top_level);

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        let defaults = Self::default();
        let config = Self {
            conflict_prefix: env::var("NOTEXFR_CONFLICT_PREFIX")
                .unwrap_or(defaults.conflict_prefix),
            match_timeout_secs: env_secs("NOTEXFR_MATCH_TIMEOUT_SECS", defaults.match_timeout_secs)?,
            backfill_timeout_secs: env_secs(
                "NOTEXFR_BACKFILL_TIMEOUT_SECS",
                defaults.backfill_timeout_secs,
            )?,
            convert_timeout_secs: env_secs(
                "NOTEXFR_CONVERT_TIMEOUT_SECS",
                defaults.convert_timeout_secs,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.conflict_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "conflict_prefix must not be empty".to_string(),
            ));
        }
        for (name, secs) in [
            ("match_timeout_secs", self.match_timeout_secs),
            ("backfill_timeout_secs", self.backfill_timeout_secs),
            ("convert_timeout_secs", self.convert_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Validation(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn match_timeout(&self) -> Duration {
        Duration::from_secs(self.match_timeout_secs)
    }

    pub fn backfill_timeout(&self) -> Duration {
        Duration::from_secs(self.backfill_timeout_secs)
    }

    pub fn convert_timeout(&self) -> Duration {
        Duration::from_secs(self.convert_timeout_secs)
    }

    /// Substitute environment variables in the format ${VAR_NAME}.
    fn substitute_env_vars(content: &str) -> String {
        let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

fn env_secs(name: &str, default: u64) -> ConfigResult<u64> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ReconcileConfig::default();
        assert_eq!(config.conflict_prefix, "conflict - ");
        assert_eq!(config.match_timeout(), Duration::from_secs(5));
        assert_eq!(config.backfill_timeout(), Duration::from_secs(10));
        assert_eq!(config.convert_timeout(), Duration::from_secs(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let config = ReconcileConfig {
            conflict_prefix: String::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ReconcileConfig {
            backfill_timeout_secs: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("backfill_timeout_secs"));
    }

    #[test]
    fn test_from_file_partial_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[reconcile]\nconflict_prefix = \"dup: \"\nmatch_timeout_secs = 30").unwrap();

        let config = ReconcileConfig::from_file(file.path()).unwrap();
        assert_eq!(config.conflict_prefix, "dup: ");
        assert_eq!(config.match_timeout_secs, 30);
        assert_eq!(config.convert_timeout_secs, defaults::CONVERT_TIMEOUT_SECS);
    }

    #[test]
    fn test_from_file_top_level_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "convert_timeout_secs = 60").unwrap();

        let config = ReconcileConfig::from_file(file.path()).unwrap();
        assert_eq!(config.convert_timeout_secs, 60);
        assert_eq!(config.conflict_prefix, defaults::CONFLICT_PREFIX);
    }

    #[test]
    fn test_from_file_invalid_value() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "match_timeout_secs = 0").unwrap();
        assert!(ReconcileConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_env_var_substitution_with_value() {
        let content = "conflict_prefix = \"${TEST_NOTEXFR_PREFIX_VAR}\"";

        env::set_var("TEST_NOTEXFR_PREFIX_VAR", "copy of ");
        let result = ReconcileConfig::substitute_env_vars(content);
        env::remove_var("TEST_NOTEXFR_PREFIX_VAR");

        assert_eq!(result, "conflict_prefix = \"copy of \"");
    }

    #[test]
    fn test_env_var_substitution_missing() {
        let content = "conflict_prefix = \"${NONEXISTENT_NOTEXFR_VAR_12345}\"";
        let result = ReconcileConfig::substitute_env_vars(content);
        assert_eq!(result, content);
    }

    #[test]
    fn test_env_secs_parsing() {
        env::set_var("TEST_NOTEXFR_SECS_OK", " 42 ");
        env::set_var("TEST_NOTEXFR_SECS_BAD", "soon");
        assert_eq!(env_secs("TEST_NOTEXFR_SECS_OK", 1).unwrap(), 42);
        assert!(matches!(
            env_secs("TEST_NOTEXFR_SECS_BAD", 1),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(env_secs("TEST_NOTEXFR_SECS_UNSET_12345", 7).unwrap(), 7);
        env::remove_var("TEST_NOTEXFR_SECS_OK");
        env::remove_var("TEST_NOTEXFR_SECS_BAD");
    }

    #[test]
    fn test_config_error_into_core_error() {
        let err: notexfr_core::Error = ConfigError::Validation("bad".to_string()).into();
        assert!(matches!(err, notexfr_core::Error::Config(_)));
    }
}
