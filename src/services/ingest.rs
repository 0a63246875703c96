//! Board ingestion service.
//!
//! Wires the scraper, its locked browser session and the normalizer together
//! so the HTTP server and the CLI run the same pipeline.

use std::sync::Arc;

use crate::browser::{BrowserLauncher, ChromeLauncher, SessionController};
use crate::config::Settings;
use crate::error::ScrapeResult;
use crate::lock::LockManager;
use crate::models::{CanonicalListing, PostDetail};
use crate::normalize::Normalizer;
use crate::scrapers::{BoardScraper, PageTimeouts};

/// Scrape-and-normalize entry points.
pub struct IngestionService {
    scraper: BoardScraper,
    normalizer: Normalizer,
}

impl IngestionService {
    /// Build from settings with an explicit lock and launcher.
    pub fn new(settings: &Settings, lock: LockManager, launcher: Arc<dyn BrowserLauncher>) -> Self {
        let session = SessionController::new(lock, launcher);
        let scraper = BoardScraper::new(
            session,
            settings.board.clone(),
            PageTimeouts::from_config(&settings.browser),
        );
        let normalizer = Normalizer::new(settings.board.effective_detail_base(), settings.matcher);
        Self {
            scraper,
            normalizer,
        }
    }

    /// Build from settings, connecting the configured lock store and using Chrome.
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        settings.lock.warn_if_process_local();
        let lock = settings.lock.build().await?;
        let launcher = Arc::new(ChromeLauncher::new(settings.browser.clone()));
        Ok(Self::new(settings, lock, launcher))
    }

    /// Scrape the board and return deduplicated canonical listings.
    pub async fn listings(&self) -> ScrapeResult<Vec<CanonicalListing>> {
        let blocks = self.scraper.scrape_list().await?;
        Ok(self.normalizer.normalize(blocks))
    }

    /// Scrape one listing's detail page.
    pub async fn detail(&self, id: &str) -> ScrapeResult<PostDetail> {
        self.scraper.scrape_detail(id).await
    }

    pub fn lock(&self) -> &LockManager {
        self.scraper.session().lock()
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }
}
