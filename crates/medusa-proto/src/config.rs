use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;
use super::protocol::API_BASE;
use super::route::UiMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where the Medusa head lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Status poll period.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// End-of-session observations tolerated before leaving the playing view.
    #[serde(default = "default_max_terminal_retries")]
    pub max_terminal_retries: u32,
    /// Forget earlier end observations once the snake reports normal playback.
    /// Off by default: the counter only grows for the lifetime of a view.
    #[serde(default)]
    pub reset_retries_on_recovery: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout. Unset means requests may wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub default_mode: UiMode,
    /// Shortest search term sent to the head.
    #[serde(default = "default_search_min_chars")]
    pub search_min_chars: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_base: default_api_base(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_terminal_retries: default_max_terminal_retries(),
            reset_retries_on_recovery: false,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_mode: UiMode::Basic,
            search_min_chars: default_search_min_chars(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_api_base() -> String {
    API_BASE.to_string()
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_max_terminal_retries() -> u32 {
    3
}

fn default_search_min_chars() -> usize {
    2
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Read `path`, writing the defaults there first if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.api_base, "/medusa/api");
        assert_eq!(config.polling.interval_ms, 1000);
        assert_eq!(config.polling.max_terminal_retries, 3);
        assert!(!config.polling.reset_retries_on_recovery);
        assert!(config.http.request_timeout_secs.is_none());
        assert_eq!(config.ui.default_mode, UiMode::Basic);
        assert!(Config::config_path().ends_with("medusa-remote/config.toml"));
    }

    #[test]
    fn first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.server.base_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[server]\nbase_url = \"http://head.lan:8080\"\n\n[ui]\ndefault_mode = \"navigation\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.base_url, "http://head.lan:8080");
        assert_eq!(config.server.api_base, "/medusa/api");
        assert_eq!(config.ui.default_mode, UiMode::Navigation);
        assert_eq!(config.ui.search_min_chars, 2);
        assert_eq!(config.polling.interval_ms, 1000);
    }
}
