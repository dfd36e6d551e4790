use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;

use crate::api::{ClientConfig, RetryPolicy};

const APP_NAME: &str = "jobboard";
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the configured API base URL
pub const API_BASE_ENV: &str = "JOBBOARD_API_BASE";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Per-attempt deadline for API calls
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries after the first attempt, transient transport failures only
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Trace every request, response and error
    #[serde(default = "default_development_logging")]
    pub development_logging: bool,
}

fn default_api_base() -> String {
    "http://localhost:3001".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_development_logging() -> bool {
    cfg!(debug_assertions)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            development_logging: default_development_logging(),
        }
    }
}

impl Config {
    /// Client settings derived from this configuration
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_base.clone())
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_retry(RetryPolicy::new(
                self.max_retries,
                Duration::from_millis(self.retry_delay_ms),
            ))
            .with_development_logging(self.development_logging)
    }

    /// Applies an `api_base` override when one is set and non-blank
    pub fn with_api_base_override(mut self, api_base: Option<String>) -> Self {
        if let Some(api_base) = api_base.filter(|v| !v.trim().is_empty()) {
            self.api_base = api_base;
        }
        self
    }
}

/// Configuration manager
pub struct ConfigManager {
    config: RwLock<Config>,
    path: PathBuf,
}

impl ConfigManager {
    /// Loads the configuration from the application config directory
    pub fn new() -> Result<Self> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        let manager = Self::load(config_dir.join(CONFIG_FILE))?;
        let env_override = std::env::var(API_BASE_ENV).ok();
        let config = manager.get().with_api_base_override(env_override);
        manager.replace(config);

        Ok(manager)
    }

    /// Loads the configuration from a specific file
    ///
    /// A missing file yields the defaults; an unreadable one is reported and
    /// replaced by the defaults.
    pub fn load(path: PathBuf) -> Result<Self> {
        let config = if path.exists() {
            let data = std::fs::read_to_string(&path).context("Failed to read config file")?;
            serde_json::from_str(&data).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Config::default()
            })
        } else {
            Config::default()
        };

        Ok(Self {
            config: RwLock::new(config),
            path,
        })
    }

    /// Gets a copy of the current configuration
    pub fn get(&self) -> Config {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, config: Config) {
        match self.config.write() {
            Ok(mut current) => *current = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }

    /// Updates and saves the configuration
    pub fn save(&self, config: Config) -> Result<()> {
        let json = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
        std::fs::write(&self.path, json).context("Failed to write config file")?;

        self.replace(config);

        Ok(())
    }

    /// Returns the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Could not determine config directory")?
            .join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Config default values tests ===

    #[test]
    fn default_timeout_is_30_seconds() {
        let config = Config::default();
        assert_eq!(config.timeout_ms, 30_000);
    }

    #[test]
    fn default_retry_is_three_times_one_second() {
        let config = Config::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_ms, 1_000);
    }

    // === Partial deserialization tests ===

    #[test]
    fn deserialize_empty_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn deserialize_partial_uses_defaults_for_missing() {
        let json = r#"{"api_base": "https://jobs.example.com", "max_retries": 0}"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.api_base, "https://jobs.example.com"); // Overridden
        assert_eq!(config.max_retries, 0); // Overridden
        assert_eq!(config.timeout_ms, 30_000); // Default
        assert_eq!(config.retry_delay_ms, 1_000); // Default
    }

    #[test]
    fn deserialize_ignores_unknown_fields() {
        let json = r#"{"timeout_ms": 500, "theme": "dark"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.timeout_ms, 500);
    }

    // === Conversion tests ===

    #[test]
    fn client_config_carries_all_settings() {
        let config = Config {
            api_base: "https://jobs.example.com/".to_string(),
            timeout_ms: 1_500,
            max_retries: 5,
            retry_delay_ms: 250,
            development_logging: true,
        };

        let client = config.to_client_config();

        assert_eq!(client.base_url, "https://jobs.example.com/");
        assert_eq!(client.timeout, Duration::from_millis(1_500));
        assert_eq!(client.retry, RetryPolicy::new(5, Duration::from_millis(250)));
        assert!(client.development_logging);
    }

    #[test]
    fn blank_override_is_ignored() {
        let config = Config::default().with_api_base_override(Some("  ".to_string()));
        assert_eq!(config.api_base, default_api_base());

        let config = Config::default().with_api_base_override(Some("http://staging".to_string()));
        assert_eq!(config.api_base, "http://staging");
    }

    // === ConfigManager tests (with temp files) ===

    #[test]
    fn manager_missing_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::load(temp_dir.path().join(CONFIG_FILE)).unwrap();

        assert_eq!(manager.get(), Config::default());
    }

    #[test]
    fn manager_malformed_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        let manager = ConfigManager::load(path).unwrap();

        assert_eq!(manager.get(), Config::default());
    }

    #[test]
    fn manager_save_persists_and_updates() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE);
        let manager = ConfigManager::load(path.clone()).unwrap();

        let updated = Config {
            timeout_ms: 5_000,
            ..manager.get()
        };
        manager.save(updated.clone()).unwrap();

        assert_eq!(manager.get(), updated);
        let reloaded = ConfigManager::load(path).unwrap();
        assert_eq!(reloaded.get().timeout_ms, 5_000);
    }
}
