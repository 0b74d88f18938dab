//! HTTP-facing error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::gate::Rejection;

/// Error body returned to API clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Missing, empty or unreadable `text`
    #[error("No text provided")]
    NoText,

    #[error("{0}")]
    Rejected(#[from] Rejection),
}

impl ServiceError {
    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::NoText => StatusCode::BAD_REQUEST,
            ServiceError::Rejected(Rejection::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::Rejected(Rejection::Overloaded) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
            // gate rejections echo the status code in the body
            status: match self {
                ServiceError::NoText => None,
                ServiceError::Rejected(_) => Some(status.as_u16()),
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
