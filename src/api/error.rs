//! JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::conformance::ConformanceError;
use crate::error::DomainError;
use crate::models::Assignment;

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    /// Overlapping assignments, present when a capacity check failed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<Assignment>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                message: message.into(),
                conflicts: Vec::new(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ConformanceError> for ApiError {
    fn from(err: ConformanceError) -> Self {
        let message = err.to_string();
        match err {
            ConformanceError::CapacityExceeded { conflicts, .. } => Self {
                status: StatusCode::CONFLICT,
                body: ErrorBody { message, conflicts },
            },
            ConformanceError::EngineerNotFound(_) => Self::not_found(message),
            ConformanceError::InvalidRange { .. } | ConformanceError::AllocationOutOfRange(_) => {
                Self::bad_request(message)
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = match err {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Invalid(_) => StatusCode::BAD_REQUEST,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
        };
        Self::new(status, err.to_string())
    }
}

/// Map a storage error to a response.
///
/// Domain and conformance errors are exposed to the client. Anything else is
/// logged in full and reported as a generic 500.
pub fn internal_error(e: anyhow::Error) -> ApiError {
    let e = match e.downcast::<ConformanceError>() {
        Ok(err) => {
            tracing::warn!("Conformance error: {}", err);
            return err.into();
        }
        Err(e) => e,
    };
    let e = match e.downcast::<DomainError>() {
        Ok(err) => {
            tracing::warn!("Validation error: {}", err);
            return err.into();
        }
        Err(e) => e,
    };

    tracing::error!("Internal error: {:#}", e);
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}
