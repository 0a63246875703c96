//! Headless browser access for JS-rendered board pages.
//!
//! Scrapers talk to the browser through the [`BrowserLauncher`], [`Browser`]
//! and [`PageDriver`] traits so session handling can be exercised without a
//! real Chrome. The chromiumoxide implementation lives in `chrome`.

mod chrome;
mod config;
mod session;

pub use chrome::ChromeLauncher;
pub use config::BrowserEngineConfig;
pub use session::SessionController;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScrapeResult;

/// Starts a browser process (or connects to a remote one).
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> ScrapeResult<Arc<dyn Browser>>;
}

/// A running browser instance owned by one session.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Open a blank page.
    async fn new_page(&self) -> ScrapeResult<Box<dyn PageDriver>>;

    /// Shut the browser down. Must be safe to call more than once.
    async fn close(&self);
}

/// A single page (tab).
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate and wait for the load to settle.
    async fn navigate(&self, url: &str) -> ScrapeResult<()>;

    /// Resolve once `selector` matches an element. Callers bound this with a timeout.
    async fn wait_for_selector(&self, selector: &str) -> ScrapeResult<()>;

    /// Evaluate a script in page context and return its JSON result.
    async fn evaluate(&self, script: &str) -> ScrapeResult<serde_json::Value>;
}
