mod assignments;
mod projects;
mod users;

use axum::{response::IntoResponse, Json};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

pub use assignments::*;
pub use projects::*;
pub use users::*;

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Shared query parameters
// ============================================================

/// Optional reference day for capacity views. Defaults to today (UTC).
#[derive(Debug, Deserialize)]
pub struct AsOfQuery {
    pub as_of: Option<NaiveDate>,
}

impl AsOfQuery {
    fn day(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}
