//! Browser engine configuration types.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Browser engine configuration (`[browser]` table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    /// Set to false to watch the session while debugging selectors.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Navigation timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// How long to wait for a required selector, in seconds.
    #[serde(default = "default_selector_timeout")]
    pub selector_timeout: u64,

    /// Viewport width in pixels.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    /// Viewport height in pixels.
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Accept invalid TLS certificates.
    #[serde(default = "default_ignore_https_errors")]
    pub ignore_https_errors: bool,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Explicit Chrome executable; otherwise common install paths are searched.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,
}

pub fn default_headless() -> bool {
    true
}

pub fn default_timeout() -> u64 {
    30
}

pub fn default_selector_timeout() -> u64 {
    20
}

fn default_viewport_width() -> u32 {
    1920
}

fn default_viewport_height() -> u32 {
    1080
}

fn default_ignore_https_errors() -> bool {
    true
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            timeout: default_timeout(),
            selector_timeout: default_selector_timeout(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            ignore_https_errors: default_ignore_https_errors(),
            chrome_args: Vec::new(),
            chrome_path: None,
            remote_url: None,
        }
    }
}

impl BrowserEngineConfig {
    /// Apply `BROWSER_URL`, `CHROME_PATH` and `BROWSER_HEADLESS`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("BROWSER_URL") {
            if !url.is_empty() {
                self.remote_url = Some(url);
            }
        }

        if let Ok(path) = env::var("CHROME_PATH") {
            if !path.is_empty() {
                self.chrome_path = Some(PathBuf::from(path));
            }
        }

        if let Ok(val) = env::var("BROWSER_HEADLESS") {
            self.headless = !(val == "0" || val.eq_ignore_ascii_case("false"));
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BrowserEngineConfig::default();
        assert!(config.headless);
        assert!(config.ignore_https_errors);
        assert_eq!(config.timeout, 30);
        assert_eq!(config.selector_timeout, 20);
        assert_eq!((config.viewport_width, config.viewport_height), (1920, 1080));
    }

    #[test]
    fn test_partial_table_fills_defaults() {
        let config: BrowserEngineConfig = toml::from_str(
            r#"
            headless = false
            remote_url = "ws://localhost:9222"
            "#,
        )
        .unwrap();
        assert!(!config.headless);
        assert_eq!(config.remote_url.as_deref(), Some("ws://localhost:9222"));
        assert_eq!(config.timeout, 30);
        assert_eq!(config.viewport_width, 1920);
    }
}
