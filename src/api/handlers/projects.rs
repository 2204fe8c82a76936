use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::AsOfQuery;
use crate::api::caller::Caller;
use crate::api::error::{internal_error, ApiError};
use crate::api::json::JsonBody;
use crate::db::Database;
use crate::models::*;

/// Query parameters for listing projects.
#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    pub status: Option<ProjectStatus>,
}

pub async fn list_projects(
    State(db): State<Database>,
    _caller: Caller,
    Query(query): Query<ListProjectsQuery>,
) -> Result<Json<Vec<Project>>, ApiError> {
    db.get_all_projects(query.status)
        .map(Json)
        .map_err(internal_error)
}

/// Project with the team allocated to it on `as_of` (default today).
pub async fn get_project(
    State(db): State<Database>,
    _caller: Caller,
    Path(id): Path<Uuid>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<ProjectDetails>, ApiError> {
    db.get_project_details(id, query.day())
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Project not found"))
}

pub async fn create_project(
    State(db): State<Database>,
    caller: Caller,
    JsonBody(input): JsonBody<CreateProjectInput>,
) -> Result<(StatusCode, Json<ProjectCreated>), ApiError> {
    caller.require_manager()?;
    db.create_project(caller.id(), input)
        .map(|p| (StatusCode::CREATED, Json(p)))
        .map_err(internal_error)
}

pub async fn update_project(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
    JsonBody(input): JsonBody<UpdateProjectInput>,
) -> Result<Json<Project>, ApiError> {
    caller.require_manager()?;
    db.update_project(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Project not found"))
}

pub async fn delete_project(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    caller.require_manager()?;
    if db.delete_project(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Project not found"))
    }
}
