use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};
use serde_json::json;
use axum::Json;
use std::time::Duration;
use thiserror::Error;

pub const NO_FILE_SELECTED_MESSAGE: &str = "Please select a file first";
pub const UPLOAD_FALLBACK_MESSAGE: &str = "An error occurred while uploading the file";
pub const MALFORMED_PAYLOAD_MESSAGE: &str = "The analysis service returned an unreadable response";

/// The `Display` text of every variant is the message shown to the user;
/// diagnostic detail stays in the variant fields and the logs.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("{}", NO_FILE_SELECTED_MESSAGE)]
    NoFileSelected,
    #[error("{}", UPLOAD_FALLBACK_MESSAGE)]
    TransportFailure(String),
    #[error("{0}")]
    ServiceError(String),
    #[error("{}", MALFORMED_PAYLOAD_MESSAGE)]
    MalformedPayload(String),
    #[error("The analysis request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("An analysis request is already in progress")]
    RequestInFlight,
    #[error("File type not allowed: {0}")]
    UnsupportedFileType(String),
    #[error("File is {size} bytes, the limit is {limit} bytes")]
    FileTooLarge { size: usize, limit: usize },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Underlying cause for logs, falling back to the user-facing message.
    pub fn detail(&self) -> String {
        match self {
            AppError::TransportFailure(detail) | AppError::MalformedPayload(detail) => detail.clone(),
            other => other.to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NoFileSelected => StatusCode::BAD_REQUEST,
            AppError::TransportFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceError(_) => StatusCode::BAD_GATEWAY,
            AppError::MalformedPayload(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::RequestInFlight => StatusCode::CONFLICT,
            AppError::UnsupportedFileType(_) => StatusCode::BAD_REQUEST,
            AppError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.detail());
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
