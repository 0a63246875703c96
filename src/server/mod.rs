//! JSON web service for scraped job listings.
//!
//! - `GET /api/jobs`: canonical listings from the board
//! - `GET /api/jobs/:id`: posted date and description for one listing
//! - `GET /health`: liveness, no scraping

mod cache;
mod handlers;
mod routes;

pub use cache::ResponseCache;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::services::IngestionService;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<IngestionService>,
    pub cache: Arc<ResponseCache>,
    /// Shared-cache freshness advertised on successful responses.
    pub max_age: Duration,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let service = IngestionService::from_settings(settings).await?;
        Ok(Self::with_service(settings, service))
    }

    pub fn with_service(settings: &Settings, service: IngestionService) -> Self {
        Self {
            service: Arc::new(service),
            cache: Arc::new(ResponseCache::with_ttl(Duration::from_secs(
                settings.server.cache_ttl_secs,
            ))),
            max_age: Duration::from_secs(settings.server.max_age_secs),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
