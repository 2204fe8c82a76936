//! Identity of the user making a request.
//!
//! Tokens are verified upstream; the gateway forwards the verified user id in
//! [`USER_ID_HEADER`]. This extractor only resolves that id to a stored user.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use super::error::{internal_error, ApiError};
use crate::db::Database;
use crate::models::User;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone)]
pub struct Caller {
    pub user: User,
}

impl Caller {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn require_manager(&self) -> Result<(), ApiError> {
        if self.user.is_manager() {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.user.id, "Manager role required");
            Err(ApiError::forbidden("Access denied. Manager role required."))
        }
    }

    /// Managers may act on anyone; everyone else only on themselves.
    pub fn require_manager_or_self(&self, target: Uuid) -> Result<(), ApiError> {
        if self.user.is_manager() || self.user.id == target {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.user.id, %target, "Insufficient permissions");
            Err(ApiError::forbidden("Access denied. Insufficient permissions."))
        }
    }
}

impl FromRequestParts<Database> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, db: &Database) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
        else {
            tracing::warn!("Missing {} header", USER_ID_HEADER);
            return Err(ApiError::unauthorized("No authenticated user provided"));
        };

        let id = Uuid::parse_str(raw.trim())
            .map_err(|_| ApiError::unauthorized("Invalid authenticated user"))?;

        let user = db
            .get_user(id)
            .map_err(internal_error)?
            .ok_or_else(|| ApiError::unauthorized("Invalid authenticated user"))?;

        Ok(Self { user })
    }
}
