use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::AsOfQuery;
use crate::api::caller::Caller;
use crate::api::error::{internal_error, ApiError};
use crate::api::json::JsonBody;
use crate::conformance::DateRange;
use crate::db::Database;
use crate::models::*;

// ============================================================
// Registration
// ============================================================

pub async fn register_user(
    State(db): State<Database>,
    JsonBody(input): JsonBody<CreateUserInput>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    db.create_user(input)
        .map(|u| (StatusCode::CREATED, Json(u)))
        .map_err(internal_error)
}

// ============================================================
// Engineers
// ============================================================

pub async fn list_engineers(
    State(db): State<Database>,
    _caller: Caller,
) -> Result<Json<Vec<User>>, ApiError> {
    db.get_engineers().map(Json).map_err(internal_error)
}

pub async fn get_engineer(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    caller.require_manager_or_self(id)?;
    db.get_engineer(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Engineer not found"))
}

pub async fn update_engineer(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
    JsonBody(input): JsonBody<UpdateUserInput>,
) -> Result<Json<User>, ApiError> {
    caller.require_manager_or_self(id)?;
    db.get_engineer(id)
        .map_err(internal_error)?
        .ok_or_else(|| ApiError::not_found("Engineer not found"))?;

    db.update_user(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Engineer not found"))
}

/// Query parameters for skill search. `skills` is comma-separated.
#[derive(Debug, Deserialize)]
pub struct SkillsQuery {
    pub skills: Option<String>,
}

pub async fn search_engineers(
    State(db): State<Database>,
    _caller: Caller,
    Query(query): Query<SkillsQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let skills: Vec<String> = query
        .skills
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if skills.is_empty() {
        return Err(ApiError::bad_request("Skills parameter is required"));
    }

    db.search_engineers_by_skills(&skills)
        .map(Json)
        .map_err(internal_error)
}

// ============================================================
// Capacity
// ============================================================

pub async fn get_engineer_capacity(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<CapacityReport>, ApiError> {
    caller.require_manager_or_self(id)?;
    db.get_capacity_report(id, query.day())
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Engineer not found"))
}

pub async fn list_capacity(
    State(db): State<Database>,
    _caller: Caller,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<Vec<CapacityReport>>, ApiError> {
    db.get_all_capacity_reports(query.day())
        .map(Json)
        .map_err(internal_error)
}

/// Query parameters for availability. Both dates are required.
#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub async fn get_engineer_availability(
    State(db): State<Database>,
    _caller: Caller,
    Path(id): Path<Uuid>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<AvailabilityReport>, ApiError> {
    let (Some(start), Some(end)) = (params.start_date, params.end_date) else {
        return Err(ApiError::bad_request("Start and end date required"));
    };

    db.get_availability(id, DateRange::new(start, end))
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Engineer not found"))
}
