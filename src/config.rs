//! Configuration for jobscrape.
//!
//! Settings come from an optional TOML file (`jobscrape.toml` in the working
//! directory, or `--config`), then environment variables applied through each
//! section's `with_env_overrides()`.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::browser::BrowserEngineConfig;
use crate::lock::LockConfig;
use crate::normalize::LocationMatcher;
use crate::scrapers::BoardConfig;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "jobscrape.toml";

/// Default listen address for `serve`.
pub const DEFAULT_BIND: &str = "127.0.0.1:3030";

/// HTTP server configuration (`[server]` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Freshness window for the in-process response cache. Zero disables it.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// `s-maxage` / `stale-while-revalidate` advertised to shared caches.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_max_age_secs() -> u64 {
    3600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cache_ttl_secs: default_cache_ttl_secs(),
            max_age_secs: default_max_age_secs(),
        }
    }
}

impl ServerConfig {
    /// Apply `BIND`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bind) = env::var("BIND") {
            if !bind.is_empty() {
                self.bind = bind;
            }
        }
        self
    }
}

/// Complete service settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub browser: BrowserEngineConfig,
    #[serde(default)]
    pub lock: LockConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub matcher: LocationMatcher,
    /// File the settings were read from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Settings {
    /// Parse settings from TOML text without applying environment overrides.
    pub fn from_toml(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| format!("Failed to parse TOML config: {}", e))
    }

    /// Load settings from a specific file path.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let mut settings = Self::from_toml(&contents)?;
        settings.source_path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Apply environment overrides to every section.
    pub fn with_env_overrides(mut self) -> Self {
        self.board = self.board.with_env_overrides();
        self.browser = self.browser.with_env_overrides();
        self.lock = self.lock.with_env_overrides();
        self.server = self.server.with_env_overrides();
        self
    }

    /// Check settings required before any scrape can run.
    pub fn validate(&self) -> Result<(), String> {
        if self.board.board_url.trim().is_empty() {
            return Err(
                "No board URL configured. Set BOARD_URL or board.board_url in jobscrape.toml"
                    .to_string(),
            );
        }
        url::Url::parse(&self.board.board_url)
            .map_err(|e| format!("Invalid board URL '{}': {}", self.board.board_url, e))?;

        if !(0.0..=1.0).contains(&self.matcher.threshold) {
            return Err(format!(
                "matcher.threshold must be within 0..=1, got {}",
                self.matcher.threshold
            ));
        }
        Ok(())
    }
}

/// Load settings from `path`, or `./jobscrape.toml` when present, then apply
/// environment overrides. An explicit path that cannot be read is an error; a
/// missing default file just means defaults.
pub async fn load_settings(path: Option<&Path>) -> Result<Settings, String> {
    let settings = match path {
        Some(path) => Settings::load_from_path(path).await?,
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILENAME);
            if default_path.exists() {
                Settings::load_from_path(&default_path).await?
            } else {
                Settings::default()
            }
        }
    };

    if let Some(ref source) = settings.source_path {
        tracing::debug!("Loaded settings from {}", source.display());
    }

    Ok(settings.with_env_overrides())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::lock::{LockBackendType, ReleaseMode};

    const SAMPLE: &str = r#"
        [board]
        board_url = "https://jobs.example.site/board"

        [board.detail]
        back_to_board_text = "return to listings"

        [browser]
        headless = false
        timeout = 45

        [lock]
        backend = "memory"
        release = "fenced"

        [server]
        bind = "0.0.0.0:8080"

        [matcher]
        threshold = 0.9
    "#;

    #[test]
    fn test_parse_full_settings() {
        let settings = Settings::from_toml(SAMPLE).unwrap();
        assert_eq!(settings.board.board_url, "https://jobs.example.site/board");
        assert_eq!(settings.board.detail.back_to_board_text, "return to listings");
        assert!(!settings.browser.headless);
        assert_eq!(settings.browser.timeout, 45);
        assert_eq!(settings.browser.selector_timeout, 20);
        assert_eq!(settings.lock.backend, LockBackendType::Memory);
        assert_eq!(settings.lock.release, ReleaseMode::Fenced);
        assert_eq!(settings.lock.ttl_secs, 300);
        assert_eq!(settings.server.bind, "0.0.0.0:8080");
        assert_eq!(settings.server.cache_ttl_secs, 3600);
        assert_eq!(settings.server.max_age_secs, 3600);
        assert_eq!(settings.matcher.threshold, 0.9);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.server.bind, DEFAULT_BIND);
        assert_eq!(settings.matcher, LocationMatcher::default());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let mut settings = Settings::from_toml(SAMPLE).unwrap();
        settings.matcher.threshold = 1.5;
        assert!(settings.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let settings = Settings::load_from_path(file.path()).await.unwrap();
        assert_eq!(settings.source_path.as_deref(), Some(file.path()));
        assert_eq!(settings.browser.timeout, 45);
    }

    #[tokio::test]
    async fn test_missing_explicit_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_settings(Some(&missing)).await.is_err());
    }
}
