//! Configuration for chrono-task.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Display settings.
    #[serde(default)]
    pub display: DisplayConfig,
    /// AI insight settings.
    #[serde(default)]
    pub insight: InsightConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to defaults.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self)?;
            std::fs::write(path, content)?;
        }
        Ok(())
    }

    /// Get configuration file path.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "chrono-task")
            .map(|d| d.config_dir().join("config.toml"))
    }

    /// Get the task data file path.
    pub fn data_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "chrono-task")
            .map(|d| d.data_dir().join("tasks.json"))
    }

    /// Get the log file path.
    pub fn log_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "chrono-task")
            .map(|d| d.data_dir().join("chrono-task.log"))
    }
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// First day of week in the calendar.
    #[serde(default)]
    pub week_start: WeekStart,
    /// Date format for the header.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            week_start: WeekStart::default(),
            date_format: default_date_format(),
        }
    }
}

fn default_date_format() -> String {
    "%A, %B %d, %Y".to_string()
}

/// First day of week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Monday,
    #[default]
    Sunday,
}

/// AI insight settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Gemini API key. The GEMINI_API_KEY environment variable overrides it.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl InsightConfig {
    /// Resolve the API key from the environment or the config file.
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.is_empty()))
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.insight.model, "gemini-2.5-flash");
        assert_eq!(config.insight.timeout_secs, 15);
        assert!(config.insight.api_key.is_none());
        assert_eq!(config.display.week_start, WeekStart::Sunday);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[insight]\nmodel = \"gemini-pro\"\n").unwrap();
        assert_eq!(config.insight.model, "gemini-pro");
        assert_eq!(config.insight.timeout_secs, 15);
        assert!(!config.display.date_format.is_empty());
    }
}
