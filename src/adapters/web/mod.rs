//! HTTP adapter.
//!
//! JSON endpoints for the brand listing, the daily spend listing and the
//! summary. Store reads run on the blocking pool.

mod error;
mod handlers;

pub use error::WebError;
pub use handlers::*;

use axum::{Router, http::HeaderValue, routing::get};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domain::listing::ListingConfig;
use crate::domain::summary::SummaryConfig;
use crate::ports::data_port::DataPort;

pub struct AppState {
    pub data_port: Arc<dyn DataPort + Send + Sync>,
    pub summary: SummaryConfig,
    pub listing: ListingConfig,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/brands", get(handlers::list_brands))
        .route("/brands/", get(handlers::list_brands))
        .route("/daily-spend", get(handlers::list_daily_spend))
        .route("/daily-spend/", get(handlers::list_daily_spend))
        .route("/summary", get(handlers::get_summary))
        .route("/summary/", get(handlers::get_summary))
        .fallback(handlers::not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(Arc::new(state))
}

/// CORS for browser frontends; any origin unless one is configured.
pub fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let origin = match allowed_origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(value) => AllowOrigin::exact(value),
        None => AllowOrigin::from(Any),
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([axum::http::Method::GET])
}
