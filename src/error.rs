// src/error.rs
// =============================================================================
// One error type for the whole import/render pipeline.
//
// Three outcomes matter to callers:
// - MalformedReference: the user typed a URL we can't read (client error)
// - UpstreamUnavailable: GitHub said no, timed out, or was unreachable
// - EntryNotFound: the repository has nothing we can render (expected)
//
// The rest cover our own bookkeeping (ledger, storage, bad request bodies).
// The HTTP service turns each variant into a status code via IntoResponse.
// =============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Cannot parse GitHub URL: {0}")]
    MalformedReference(String),

    #[error("GitHub API error: {0}")]
    UpstreamUnavailable(String),

    #[error("No HTML file found in repository")]
    EntryNotFound,

    #[error("Assignment {0} not found")]
    AssignmentNotFound(u64),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Ledger error: {0}")]
    Ledger(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedReference(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::EntryNotFound | AppError::AssignmentNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Storage(_) | AppError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Categorizes reqwest failures the same way for every upstream call.
// Whatever went wrong, the caller only sees UpstreamUnavailable; the
// message keeps enough detail to tell a timeout from a refused connection.
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            format!("connection failed: {}", error)
        } else if error.is_decode() {
            format!("unexpected response body: {}", error)
        } else {
            error.to_string()
        };

        let url = error.url().map(|u| u.as_str().to_string());
        match url {
            Some(url) => AppError::UpstreamUnavailable(format!("{} ({})", message, url)),
            None => AppError::UpstreamUnavailable(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
