use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};
use crate::logging::{LogConfig, LogFormat, LogLevel};
use crate::stats::StatsConfig;

/// Keys accepted by [`AppConfig::get_value`] and [`AppConfig::set_value`]
pub const CONFIG_KEYS: &[&str] = &[
    "stats.weekly_goal",
    "stats.history_weeks",
    "logging.level",
    "logging.format",
    "import.sessions_file",
];

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Streak and calendar settings
    #[serde(default)]
    pub stats: StatsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,

    /// Session history loading preferences
    #[serde(default)]
    pub import: ImportSettings,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Session history loading preferences
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Session file used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            stats: StatsConfig::default(),
            logging: LogConfig::default(),
            import: ImportSettings::default(),
        }
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            reason: e.to_string(),
        })?;

        fs::write(&path, toml_content)?;
        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".liftrs")
            .join("config.toml")
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// file is missing or unreadable
    pub fn load_or_default_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable config, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from the default location with fallback to defaults
    pub fn load_or_default() -> Self {
        Self::load_or_default_from(Self::default_config_path())
    }

    /// Save configuration to default location
    pub fn save_default(&mut self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to_file(config_path)
    }

    /// Read a single setting as text
    pub fn get_value(&self, key: &str) -> Result<String> {
        let value = match key {
            "stats.weekly_goal" => self.stats.weekly_goal.to_string(),
            "stats.history_weeks" => self.stats.history_weeks.to_string(),
            "logging.level" => self.logging.level.to_string(),
            "logging.format" => self.logging.format.to_string(),
            "import.sessions_file" => self
                .import
                .sessions_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                }
                .into())
            }
        };
        Ok(value)
    }

    /// Update a single setting from text
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "stats.weekly_goal" => {
                self.stats.weekly_goal = value.parse().map_err(|_| invalid(key, value))?;
            }
            "stats.history_weeks" => {
                self.stats.history_weeks = value.parse().map_err(|_| invalid(key, value))?;
            }
            "logging.level" => {
                self.logging.level = value.parse::<LogLevel>().map_err(|_| invalid(key, value))?;
            }
            "logging.format" => {
                self.logging.format = value.parse::<LogFormat>().map_err(|_| invalid(key, value))?;
            }
            "import.sessions_file" => {
                self.import.sessions_file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                }
                .into())
            }
        }

        self.metadata.updated_at = Utc::now();
        Ok(())
    }

    /// All settings as `(key, value)` pairs
    pub fn list_values(&self) -> Vec<(&'static str, String)> {
        CONFIG_KEYS
            .iter()
            .filter_map(|key| self.get_value(key).ok().map(|value| (*key, value)))
            .collect()
    }
}
