//! JSON endpoint handlers.
//!
//! Every response is a JSON envelope with an explicit `success` flag.
//! Successful scrapes are publicly cacheable; failures are `no-store`.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::AppState;
use crate::error::ScrapeError;
use crate::models::{format_id, CanonicalListing, PostDetail};

/// Seconds a client should wait after being refused by a busy browser lock.
pub const RETRY_AFTER_SECS: u64 = 30;

#[derive(Serialize)]
struct ListResponse<'a> {
    success: bool,
    count: usize,
    data: &'a [CanonicalListing],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailResponse<'a> {
    success: bool,
    #[serde(rename = "postID")]
    post_id: &'a str,
    formatted_id: String,
    post: &'a PostDetail,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

fn public_cache_control(state: &AppState) -> HeaderValue {
    let ttl = state.max_age.as_secs();
    let value = format!(
        "public, max-age=0, s-maxage={}, stale-while-revalidate={}",
        ttl, ttl
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("no-store"))
}

fn error_response(status: StatusCode, error: &ScrapeError) -> Response {
    let body = Json(ErrorResponse {
        success: false,
        error: error.to_string(),
    });
    let mut response = (status, body).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Health check endpoint. Never touches the browser.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "success": true, "status": "ok" }))
}

/// `GET /api/jobs`: scrape (or serve cached) canonical listings.
pub async fn list_jobs(State(state): State<AppState>) -> Response {
    let listings = match state.cache.get_listings() {
        Some(listings) => {
            tracing::debug!("Serving {} cached listings", listings.len());
            listings
        }
        None => match state.service.listings().await {
            Ok(listings) => state.cache.set_listings(listings),
            Err(e) if e.is_lock_held() => {
                tracing::info!("List scrape refused: {}", e);
                let mut response = error_response(StatusCode::SERVICE_UNAVAILABLE, &e);
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
                return response;
            }
            Err(e) => {
                tracing::error!("List scrape failed: {}", e);
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e);
            }
        },
    };

    let body = Json(ListResponse {
        success: true,
        count: listings.len(),
        data: &listings,
    });
    let mut response = body.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, public_cache_control(&state));
    response
}

/// `GET /api/jobs/:id`: scrape (or serve cached) one listing's detail.
pub async fn job_detail(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let detail = match state.cache.get_detail(&id) {
        Some(detail) => detail,
        None => match state.service.detail(&id).await {
            Ok(detail) => {
                state.cache.set_detail(id.clone(), detail.clone());
                detail
            }
            Err(e) => {
                tracing::error!("Detail scrape for {} failed: {}", id, e);
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e);
            }
        },
    };

    let body = Json(DetailResponse {
        success: true,
        post_id: &id,
        formatted_id: format_id(&id),
        post: &detail,
    });
    let mut response = body.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, public_cache_control(&state));
    response
}
