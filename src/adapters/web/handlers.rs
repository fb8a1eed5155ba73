//! HTTP request handlers for the web adapter.

use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;

use crate::domain::error::BrandspendError;
use crate::domain::record::{Brand, DailySpend};
use crate::domain::summary::{Summary, SummaryConfig};
use crate::domain::summary_service;

use super::{AppState, WebError};

/// `?limit=` as sent by the browser. Unparsable values fall back to the default.
#[derive(Debug, Default, serde::Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

impl LimitQuery {
    fn requested(&self) -> Option<i64> {
        self.limit.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct SummaryQuery {
    pub top_n: Option<String>,
}

pub async fn list_brands(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Brand>>, WebError> {
    let limit = state.listing.clamp(query.requested());
    tracing::debug!(limit, "listing brands");

    let port = Arc::clone(&state.data_port);
    let brands = tokio::task::spawn_blocking(move || port.list_brands(limit))
        .await?
        .map_err(BrandspendError::into_unavailable)?;
    Ok(Json(brands))
}

pub async fn list_daily_spend(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<DailySpend>>, WebError> {
    let limit = state.listing.clamp(query.requested());
    tracing::debug!(limit, "listing daily spend");

    let port = Arc::clone(&state.data_port);
    let spends = tokio::task::spawn_blocking(move || port.list_daily_spend(limit))
        .await?
        .map_err(BrandspendError::into_unavailable)?;
    Ok(Json(spends))
}

pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Summary>, WebError> {
    let config = match query.top_n.as_deref() {
        None => state.summary,
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(top_n) if top_n >= 1 => SummaryConfig { top_n },
            _ => return Err(WebError::bad_request("top_n must be a positive integer")),
        },
    };

    let port = Arc::clone(&state.data_port);
    let summary =
        tokio::task::spawn_blocking(move || summary_service::get_summary(&*port, &config))
            .await??;
    Ok(Json(summary))
}

pub async fn not_found() -> WebError {
    WebError::not_found("not found")
}
