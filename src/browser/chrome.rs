//! chromiumoxide (CDP) implementation of the browser traits.

use std::sync::Arc;

use async_trait::async_trait;

#[cfg(feature = "browser")]
use super::PageDriver;
use super::{Browser, BrowserEngineConfig, BrowserLauncher};
use crate::error::{ScrapeError, ScrapeResult};

#[cfg(feature = "browser")]
pub use imp::ChromeLauncher;

#[cfg(feature = "browser")]
mod imp {
    use std::path::PathBuf;
    use std::time::Duration;

    use chromiumoxide::{Browser as CdpBrowser, BrowserConfig, Page};
    use futures::StreamExt;
    use tokio::sync::Mutex;
    use tokio::task::JoinHandle;
    use tracing::{debug, info, warn};

    use super::*;

    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &[&str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Interval between selector probes.
    const SELECTOR_POLL: Duration = Duration::from_millis(250);

    /// Launches a local Chrome, or attaches to `remote_url` when configured.
    pub struct ChromeLauncher {
        config: BrowserEngineConfig,
    }

    impl ChromeLauncher {
        pub fn new(config: BrowserEngineConfig) -> Self {
            Self { config }
        }

        fn find_chrome(&self) -> ScrapeResult<PathBuf> {
            if let Some(ref path) = self.config.chrome_path {
                return Ok(path.clone());
            }

            for path in CHROME_PATHS {
                let p = std::path::Path::new(path);
                if p.exists() {
                    debug!("Found Chrome at: {}", path);
                    return Ok(p.to_path_buf());
                }
            }

            // Check if in PATH via `which`
            for cmd in &[
                "google-chrome",
                "google-chrome-stable",
                "chromium",
                "chromium-browser",
            ] {
                if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                    if output.status.success() {
                        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                        if !path.is_empty() {
                            debug!("Found Chrome in PATH: {}", path);
                            return Ok(PathBuf::from(path));
                        }
                    }
                }
            }

            Err(ScrapeError::BrowserLaunch(
                "Chrome/Chromium not found. Install it or set CHROME_PATH / BROWSER_URL"
                    .to_string(),
            ))
        }

        async fn launch_local(&self) -> ScrapeResult<ChromeBrowser> {
            info!("Launching browser (headless={})", self.config.headless);
            let chrome_path = self.find_chrome()?;

            let mut builder = BrowserConfig::builder()
                .chrome_executable(chrome_path)
                .window_size(self.config.viewport_width, self.config.viewport_height)
                .viewport(None)
                .request_timeout(Duration::from_secs(self.config.timeout));

            // with_head means NOT headless
            if !self.config.headless {
                builder = builder.with_head();
            }

            if self.config.ignore_https_errors {
                builder = builder.arg("--ignore-certificate-errors");
            }

            builder = builder
                .arg("--disable-dev-shm-usage")
                .arg("--no-first-run")
                .arg("--no-default-browser-check")
                .arg("--disable-background-networking")
                .arg("--disable-sync")
                .arg("--disable-translate")
                .arg("--no-sandbox") // Often needed for headless in containers
                .arg("--disable-gpu");

            for arg in &self.config.chrome_args {
                builder = builder.arg(arg);
            }

            let config = builder
                .build()
                .map_err(|e| ScrapeError::BrowserLaunch(format!("invalid browser config: {}", e)))?;

            let (browser, mut handler) = CdpBrowser::launch(config)
                .await
                .map_err(|e| ScrapeError::BrowserLaunch(e.to_string()))?;

            let handler_task = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            Ok(ChromeBrowser::new(browser, handler_task, false))
        }

        async fn connect_remote(&self, url: &str) -> ScrapeResult<ChromeBrowser> {
            info!(
                "Connecting to remote browser at {} (timeout: {}s)",
                url, self.config.timeout
            );

            // Get WebSocket URL from the /json/version endpoint
            let http_url = url
                .replace("ws://", "http://")
                .replace("wss://", "https://");
            let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

            let resp: serde_json::Value = reqwest::Client::new()
                .get(&version_url)
                .send()
                .await
                .map_err(|e| ScrapeError::BrowserLaunch(format!("remote browser: {}", e)))?
                .json()
                .await
                .map_err(|e| ScrapeError::BrowserLaunch(format!("remote browser version: {}", e)))?;

            let ws_url = resp
                .get("webSocketDebuggerUrl")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    ScrapeError::BrowserLaunch("No webSocketDebuggerUrl in response".to_string())
                })?;

            debug!("Connecting to WebSocket: {}", ws_url);

            let handler_config = chromiumoxide::handler::HandlerConfig {
                request_timeout: Duration::from_secs(self.config.timeout),
                ..Default::default()
            };

            let (browser, mut handler) = CdpBrowser::connect_with_config(ws_url, handler_config)
                .await
                .map_err(|e| ScrapeError::BrowserLaunch(e.to_string()))?;

            let handler_task = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            Ok(ChromeBrowser::new(browser, handler_task, true))
        }
    }

    #[async_trait]
    impl BrowserLauncher for ChromeLauncher {
        async fn launch(&self) -> ScrapeResult<Arc<dyn Browser>> {
            let browser = match self.config.remote_url.clone() {
                Some(remote_url) => self.connect_remote(&remote_url).await?,
                None => self.launch_local().await?,
            };
            Ok(Arc::new(browser))
        }
    }

    /// One chromiumoxide browser plus its CDP event loop.
    struct ChromeBrowser {
        inner: Mutex<Option<CdpBrowser>>,
        handler_task: JoinHandle<()>,
        remote: bool,
    }

    impl ChromeBrowser {
        fn new(browser: CdpBrowser, handler_task: JoinHandle<()>, remote: bool) -> Self {
            Self {
                inner: Mutex::new(Some(browser)),
                handler_task,
                remote,
            }
        }
    }

    #[async_trait]
    impl Browser for ChromeBrowser {
        async fn new_page(&self) -> ScrapeResult<Box<dyn PageDriver>> {
            let guard = self.inner.lock().await;
            let browser = guard
                .as_ref()
                .ok_or_else(|| ScrapeError::BrowserLaunch("browser already closed".to_string()))?;
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ScrapeError::BrowserLaunch(format!("failed to open page: {}", e)))?;
            Ok(Box::new(ChromePage { page }))
        }

        async fn close(&self) {
            let Some(mut browser) = self.inner.lock().await.take() else {
                return;
            };

            // A shared remote browser is left running; dropping the connection is enough
            if !self.remote {
                if let Err(e) = browser.close().await {
                    warn!("Failed to close browser: {}", e);
                }
                if let Err(e) = browser.wait().await {
                    warn!("Failed waiting for browser exit: {}", e);
                }
            }
            drop(browser);
            self.handler_task.abort();
        }
    }

    impl Drop for ChromeBrowser {
        fn drop(&mut self) {
            self.handler_task.abort();
        }
    }

    struct ChromePage {
        page: Page,
    }

    #[async_trait]
    impl PageDriver for ChromePage {
        async fn navigate(&self, url: &str) -> ScrapeResult<()> {
            debug!("Navigating to {}", url);
            self.page.goto(url).await.map_err(|e| {
                let message = e.to_string();
                if message.contains("net::ERR") {
                    ScrapeError::UpstreamUnavailable(format!("{}: {}", url, message))
                } else {
                    ScrapeError::Navigation {
                        url: url.to_string(),
                        message,
                    }
                }
            })?;
            Ok(())
        }

        async fn wait_for_selector(&self, selector: &str) -> ScrapeResult<()> {
            loop {
                if self.page.find_element(selector).await.is_ok() {
                    return Ok(());
                }
                tokio::time::sleep(SELECTOR_POLL).await;
            }
        }

        async fn evaluate(&self, script: &str) -> ScrapeResult<serde_json::Value> {
            self.page
                .evaluate(script.to_string())
                .await
                .map_err(|e| ScrapeError::Evaluation(e.to_string()))?
                .into_value()
                .map_err(|e| ScrapeError::Evaluation(e.to_string()))
        }
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct ChromeLauncher {
    #[allow(dead_code)]
    config: BrowserEngineConfig,
}

#[cfg(not(feature = "browser"))]
impl ChromeLauncher {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> ScrapeResult<Arc<dyn Browser>> {
        Err(ScrapeError::BrowserLaunch(
            "Browser support not compiled. Rebuild with: cargo build --features browser"
                .to_string(),
        ))
    }
}
