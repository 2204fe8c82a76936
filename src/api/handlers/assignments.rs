use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::caller::Caller;
use crate::api::error::{internal_error, ApiError};
use crate::api::json::JsonBody;
use crate::db::Database;
use crate::models::*;

pub async fn list_assignments(
    State(db): State<Database>,
    _caller: Caller,
) -> Result<Json<Vec<AssignmentDetails>>, ApiError> {
    db.get_all_assignments().map(Json).map_err(internal_error)
}

pub async fn list_engineer_assignments(
    State(db): State<Database>,
    _caller: Caller,
    Path(engineer_id): Path<Uuid>,
) -> Result<Json<Vec<AssignmentDetails>>, ApiError> {
    db.get_assignments_by_engineer(engineer_id)
        .map(Json)
        .map_err(internal_error)
}

pub async fn list_project_assignments(
    State(db): State<Database>,
    _caller: Caller,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<AssignmentDetails>>, ApiError> {
    db.get_assignments_by_project(project_id)
        .map(Json)
        .map_err(internal_error)
}

pub async fn get_assignment(
    State(db): State<Database>,
    _caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<AssignmentDetails>, ApiError> {
    db.get_assignment(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Assignment not found"))
}

/// Create an assignment. Responds 409 with the overlapping assignments when
/// the engineer's capacity would be exceeded.
pub async fn create_assignment(
    State(db): State<Database>,
    caller: Caller,
    JsonBody(input): JsonBody<CreateAssignmentInput>,
) -> Result<(StatusCode, Json<AssignmentDetails>), ApiError> {
    caller.require_manager()?;
    db.create_assignment(input)
        .map(|a| (StatusCode::CREATED, Json(a)))
        .map_err(internal_error)
}

pub async fn update_assignment(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
    JsonBody(input): JsonBody<UpdateAssignmentInput>,
) -> Result<Json<AssignmentDetails>, ApiError> {
    caller.require_manager()?;
    db.update_assignment(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Assignment not found"))
}

pub async fn delete_assignment(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    caller.require_manager()?;
    if db.delete_assignment(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Assignment not found"))
    }
}
