//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: interest text must not be empty",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                   |
/// |-----------|-------------------|-------------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request               |
/// | 2000–2999 | State/Not Found   | 404 Not Found                 |
/// | 3000–3999 | Server            | 500 Internal Server Error     |
/// | 4000–4999 | Embedding Service | 502 Bad Gateway / 504 Timeout |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Interest record with the given ID was not found.
    #[error("interest not found: {0}")]
    InterestNotFound(uuid::Uuid),

    /// A conditional match update found one of the records already claimed.
    #[error("interest already matched")]
    AlreadyMatched,

    /// Room does not exist or no longer has two members.
    #[error("room {0} is not available")]
    RoomUnavailable(String),

    /// The embedding service did not answer within the deadline.
    #[error("embedding service timed out after {0}s")]
    EmbeddingTimeout(u64),

    /// The embedding service answered with an error or a malformed body.
    #[error("embedding service error: {0}")]
    EmbeddingService(String),

    /// Persistence layer failure.
    #[error("store error: {0}")]
    Store(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::InterestNotFound(_) => 2001,
            Self::AlreadyMatched => 2002,
            Self::RoomUnavailable(_) => 2003,
            Self::Store(_) => 3001,
            Self::Internal(_) => 3000,
            Self::EmbeddingService(_) => 4001,
            Self::EmbeddingTimeout(_) => 4002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InterestNotFound(_) | Self::AlreadyMatched | Self::RoomUnavailable(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::EmbeddingService(_) => StatusCode::BAD_GATEWAY,
            Self::EmbeddingTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
