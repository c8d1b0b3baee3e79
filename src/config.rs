use crate::dedup::DedupConfig;
use crate::error::{RateMyFitError, Result};
use crate::poller::PollerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const API_KEY_ENV: &str = "RATEMYFIT_API_KEY";
const BASE_URL_ENV: &str = "RATEMYFIT_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub dedup_window_ms: u64,
    pub max_concurrent_requests: usize,
    pub poll_interval_secs: u64,
    pub notice_cooldown_secs: u64,
    pub max_image_bytes: usize,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "http://localhost:54321".into(),
            dedup_window_ms: 30_000,
            max_concurrent_requests: 1,
            poll_interval_secs: 5,
            notice_cooldown_secs: 30,
            max_image_bytes: 10 * 1024 * 1024,
            timeout_seconds: 120,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| RateMyFitError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("ratemyfit").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key.clone().ok_or(RateMyFitError::MissingApiKey)
    }

    pub fn get_base_url(&self) -> String {
        std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.base_url.clone())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn set_base_url(&mut self, url: String) -> Result<()> {
        self.base_url = url;
        self.save()
    }

    pub fn dedup_config(&self) -> DedupConfig {
        DedupConfig {
            dedup_window: Duration::from_millis(self.dedup_window_ms),
            max_concurrent_requests: self.max_concurrent_requests,
        }
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            notice_cooldown: Duration::from_secs(self.notice_cooldown_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.dedup_window_ms, 30_000);
        assert_eq!(config.max_concurrent_requests, 1);
        assert_eq!(config.poll_interval_secs, 5);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            api_key: Some("secret".into()),
            max_concurrent_requests: 3,
            ..Default::default()
        };
        config.save_to(&path).expect("設定保存失敗");

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("secret"));
        assert_eq!(loaded.max_concurrent_requests, 3);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"dedup_window_ms": 1000}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.dedup_window_ms, 1000);
        assert_eq!(config.notice_cooldown_secs, 30);
        assert_eq!(config.dedup_config().dedup_window, Duration::from_secs(1));
    }

    #[test]
    fn test_corrupted_file_is_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(RateMyFitError::JsonParse(_))
        ));
    }

    #[test]
    fn test_poll_interval_never_zero() {
        let config = Config {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.poller_config().interval, Duration::from_secs(1));
    }
}
