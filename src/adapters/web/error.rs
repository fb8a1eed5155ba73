//! HTTP error responses for the web adapter.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::domain::error::BrandspendError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &BrandspendError) -> StatusCode {
    match err {
        BrandspendError::ConfigMissing { .. }
        | BrandspendError::ConfigInvalid { .. }
        | BrandspendError::ConfigParse { .. } => StatusCode::BAD_REQUEST,
        BrandspendError::DataUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        BrandspendError::Database { .. }
        | BrandspendError::DatabaseQuery { .. }
        | BrandspendError::Import { .. }
        | BrandspendError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<BrandspendError> for WebError {
    fn from(err: BrandspendError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl From<tokio::task::JoinError> for WebError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("store task failed: {err}"))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), error = %self.message, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}
