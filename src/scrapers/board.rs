//! List and detail scrapes of the job board.
//!
//! Each scrape is one locked browser session: one page, one navigation, one
//! bounded selector wait, one evaluation. Parsing of the returned markup is
//! delegated to [`super::extract`].

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use super::config::BoardConfig;
use super::extract::{extract_blocks, extract_detail};
use crate::browser::{BrowserEngineConfig, PageDriver, SessionController};
use crate::error::{ScrapeError, ScrapeResult};
use crate::models::{format_id, upstream_url, PostDetail, RawBlock};

/// Lock resource id for list scrapes.
pub const LIST_RESOURCE: &str = "board-list";

/// Navigation and selector bounds for one page visit.
#[derive(Debug, Clone, Copy)]
pub struct PageTimeouts {
    pub navigation: Duration,
    pub selector: Duration,
}

impl PageTimeouts {
    pub fn from_config(config: &BrowserEngineConfig) -> Self {
        Self {
            navigation: Duration::from_secs(config.timeout),
            selector: Duration::from_secs(config.selector_timeout),
        }
    }
}

impl Default for PageTimeouts {
    fn default() -> Self {
        Self::from_config(&BrowserEngineConfig::default())
    }
}

#[derive(Debug, Default, Deserialize)]
struct DetailMarkup {
    #[serde(default)]
    content: String,
    #[serde(default)]
    properties: String,
}

/// Scrapes the board through a [`SessionController`].
pub struct BoardScraper {
    session: SessionController,
    config: BoardConfig,
    timeouts: PageTimeouts,
}

impl BoardScraper {
    pub fn new(session: SessionController, config: BoardConfig, timeouts: PageTimeouts) -> Self {
        Self {
            session,
            config,
            timeouts,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    /// Scrape the listing table into raw rows.
    pub async fn scrape_list(&self) -> ScrapeResult<Vec<RawBlock>> {
        let config = &self.config;
        let timeouts = self.timeouts;

        let blocks = self
            .session
            .with_locked_browser(LIST_RESOURCE, move |browser| async move {
                let page = browser.new_page().await?;
                visit(page.as_ref(), &config.board_url, &config.list.container, timeouts).await?;

                let html = page.evaluate(&outer_html_script(&config.list.container)?).await?;
                let html = html.as_str().unwrap_or_default();
                extract_blocks(html, &config.list)
            })
            .await?;

        info!("Scraped {} rows from {}", blocks.len(), self.config.board_url);
        Ok(blocks)
    }

    /// Scrape one listing's detail page by its upstream id.
    pub async fn scrape_detail(&self, id: &str) -> ScrapeResult<PostDetail> {
        let config = &self.config;
        let timeouts = self.timeouts;
        let url = upstream_url(&config.effective_detail_base(), &format_id(id));
        let resource_id = format!("board-detail:{}", id);

        let url_ref = url.as_str();
        let detail = self
            .session
            .with_locked_browser(&resource_id, move |browser| async move {
                let page = browser.new_page().await?;
                visit(page.as_ref(), url_ref, &config.detail.content, timeouts).await?;

                let script = detail_script(&config.detail.content, &config.detail.properties)?;
                let markup: DetailMarkup = serde_json::from_value(page.evaluate(&script).await?)
                    .map_err(|e| ScrapeError::Evaluation(e.to_string()))?;

                extract_detail(
                    &markup.content,
                    &markup.properties,
                    &config.detail,
                    config.upstream_host().as_deref(),
                    &config.expected_years(),
                )
            })
            .await?;

        debug!(
            "Scraped detail {} (date: {}, description: {})",
            url,
            detail.date_posted.is_some(),
            detail.description.is_some()
        );
        Ok(detail)
    }
}

/// Navigate and wait for `selector`, each under its own timeout.
async fn visit(
    page: &dyn PageDriver,
    url: &str,
    selector: &str,
    timeouts: PageTimeouts,
) -> ScrapeResult<()> {
    match tokio::time::timeout(timeouts.navigation, page.navigate(url)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(ScrapeError::NavigationTimeout {
                url: url.to_string(),
                secs: timeouts.navigation.as_secs(),
            })
        }
    }

    match tokio::time::timeout(timeouts.selector, page.wait_for_selector(selector)).await {
        Ok(result) => result,
        Err(_) => Err(ScrapeError::SelectorNotFound {
            selector: selector.to_string(),
            url: url.to_string(),
        }),
    }
}

fn js_string(s: &str) -> ScrapeResult<String> {
    serde_json::to_string(s).map_err(|e| ScrapeError::Evaluation(e.to_string()))
}

/// Script returning the container's outer HTML, or "" when absent.
fn outer_html_script(selector: &str) -> ScrapeResult<String> {
    Ok(format!(
        "(() => {{ const el = document.querySelector({}); return el ? el.outerHTML : \"\"; }})()",
        js_string(selector)?
    ))
}

/// Script returning `{content, properties}` outer HTML for a detail page.
fn detail_script(content: &str, properties: &str) -> ScrapeResult<String> {
    Ok(format!(
        "(() => {{ \
            const html = (s) => {{ const el = document.querySelector(s); return el ? el.outerHTML : \"\"; }}; \
            return {{ content: html({}), properties: html({}) }}; \
        }})()",
        js_string(content)?,
        js_string(properties)?
    ))
}
