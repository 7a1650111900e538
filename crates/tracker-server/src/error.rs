use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracker_core::TrackerError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Compute error: {0}")]
    Compute(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::InvalidAddress(address) => AppError::InvalidAddress(address),
            TrackerError::Upstream(msg) => AppError::Upstream(msg),
            TrackerError::Compute(msg) => AppError::Compute(msg),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidAddress(_) => (StatusCode::BAD_REQUEST, "INVALID_ADDRESS"),
            AppError::Upstream(_) => (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR"),
            AppError::Compute(_) => (StatusCode::INTERNAL_SERVER_ERROR, "COMPUTE_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        match &self {
            AppError::InvalidAddress(address) => {
                tracing::warn!(wallet = %address, error_code = code, "Invalid wallet address");
            }
            AppError::Upstream(msg) => {
                tracing::error!(message = %msg, error_code = code, "Upstream provider error");
            }
            AppError::Compute(msg) => {
                // Non-finite metrics mean bad input data or a calculator bug
                tracing::error!(message = %msg, error_code = code, "Performance computation failed");
            }
            AppError::Internal(msg) => {
                tracing::error!(message = %msg, error_code = code, "Internal error");
            }
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Turn a handler panic into the standard 500 body
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "handler panicked".to_string()
    };

    AppError::Internal(detail).into_response()
}
