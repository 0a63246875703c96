//! Error types for browser scraping sessions.

use crate::lock::LockError;

/// Result type for scraping operations.
pub type ScrapeResult<T> = Result<T, ScrapeError>;

/// Failures surfaced by a browser session or a scraper routine.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("Timed out after {secs}s navigating to {url}")]
    NavigationTimeout { url: String, secs: u64 },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// The upstream board could not be reached at all (DNS, refused, reset).
    #[error("Upstream board unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Selector '{selector}' not found on {url}")]
    SelectorNotFound { selector: String, url: String },

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Page evaluation failed: {0}")]
    Evaluation(String),
}

impl ScrapeError {
    /// Whether the session was refused because another one is running.
    pub fn is_lock_held(&self) -> bool {
        matches!(self, ScrapeError::Lock(LockError::Held { .. }))
    }

    /// Whether retrying later could succeed without operator action.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ScrapeError::Lock(LockError::Held { .. })
                | ScrapeError::NavigationTimeout { .. }
                | ScrapeError::UpstreamUnavailable(_)
        )
    }
}
