//! Mapping of ledger and application errors to HTTP responses.
//!
//! Every error body has the shape `{"error": CODE, "message": text}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use splitledger_core::ledger::LedgerError;
use splitledger_shared::AppError;

/// Errors a handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// A ledger rule rejected the request or a computation failed.
    Ledger(LedgerError),
    /// An outer-layer failure (authentication, malformed request, routing).
    App(AppError),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl ApiError {
    fn parts(&self) -> (u16, &'static str, String) {
        match self {
            Self::Ledger(e) => (e.http_status_code(), e.error_code(), e.to_string()),
            Self::App(e) => (e.status_code(), e.error_code(), e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Internal details stay in the logs
        let message = if status.is_server_error() {
            error!(error = %message, code, "Request failed");
            "An internal error occurred".to_string()
        } else {
            warn!(error = %message, code, "Request rejected");
            message
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}
