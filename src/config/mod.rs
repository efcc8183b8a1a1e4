// Configuration for the analyzer, history store and alert manager

pub mod defaults;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::alerts::AlertLevel;
use crate::error::ConfigError;

/// Thresholds used by the health analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Temperature (°C) that raises a warning issue
    pub temp_warning: i32,
    /// Temperature (°C) that raises a critical issue
    pub temp_critical: i32,
    /// SSD percent-used that sets wear status to warning
    pub wear_warning: f64,
    /// SSD percent-used that sets wear status to critical
    pub wear_critical: f64,
    /// Compute the predictive failure score
    pub enable_prediction: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            temp_warning: defaults::DEFAULT_TEMP_WARNING,
            temp_critical: defaults::DEFAULT_TEMP_CRITICAL,
            wear_warning: defaults::DEFAULT_WEAR_WARNING,
            wear_critical: defaults::DEFAULT_WEAR_CRITICAL,
            enable_prediction: true,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.temp_warning >= self.temp_critical {
            return Err(ConfigError::Invalid {
                field: "analyzer.temp_warning",
                reason: format!(
                    "must be below temp_critical ({} >= {})",
                    self.temp_warning, self.temp_critical
                ),
            });
        }
        for (field, value) in [
            ("analyzer.wear_warning", self.wear_warning),
            ("analyzer.wear_critical", self.wear_critical),
        ] {
            if value.is_nan() || value <= 0.0 || value > 100.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be within (0, 100], got {value}"),
                });
            }
        }
        if self.wear_warning >= self.wear_critical {
            return Err(ConfigError::Invalid {
                field: "analyzer.wear_warning",
                reason: format!(
                    "must be below wear_critical ({} >= {})",
                    self.wear_warning, self.wear_critical
                ),
            });
        }
        Ok(())
    }
}

/// History store location and retention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Database file; `None` means the default under the user config dir
    pub path: Option<PathBuf>,
    pub retention_days: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            retention_days: defaults::DEFAULT_RETENTION_DAYS,
        }
    }
}

impl HistoryConfig {
    /// Configured path, or `<config dir>/drive-health/history.db`.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(default_history_path)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_days.saturating_mul(24 * 60 * 60))
    }
}

/// Webhook alerting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub enabled: bool,
    pub webhook_url: String,
    pub webhook_timeout_secs: u64,
    /// Alerts below this level are dropped
    pub min_level: AlertLevel,
    /// Minimum minutes between alert batches for the same device
    pub cooldown_minutes: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: String::new(),
            webhook_timeout_secs: defaults::DEFAULT_WEBHOOK_TIMEOUT_SECS,
            min_level: AlertLevel::Warning,
            cooldown_minutes: defaults::DEFAULT_COOLDOWN_MINUTES,
        }
    }
}

impl AlertConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_minutes.saturating_mul(60))
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.webhook_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "alerts.webhook_url",
                reason: "required when alerts are enabled".to_string(),
            });
        }
        if self.enabled && self.webhook_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "alerts.webhook_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Top-level configuration, usually deserialized from a TOML document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveHealthConfig {
    pub analyzer: AnalyzerConfig,
    pub history: HistoryConfig,
    pub alerts: AlertConfig,
}

impl DriveHealthConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(src).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analyzer.validate()?;
        self.alerts.validate()
    }
}

/// Default history database location.
pub fn default_history_path() -> Option<PathBuf> {
    config_dir().map(|dir| {
        dir.join(defaults::APP_DIR_NAME)
            .join(defaults::HISTORY_FILE_NAME)
    })
}

/// Per-user configuration directory: `$XDG_CONFIG_HOME`, `$HOME/.config` or `%APPDATA%`.
fn config_dir() -> Option<PathBuf> {
    let non_empty = |key: &str| std::env::var_os(key).filter(|v| !v.is_empty());
    non_empty("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| non_empty("HOME").map(|h| PathBuf::from(h).join(".config")))
        .or_else(|| non_empty("APPDATA").map(PathBuf::from))
}
