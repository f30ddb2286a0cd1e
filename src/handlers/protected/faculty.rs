// handlers/protected/faculty.rs - /api/faculty

use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use super::RejectBody;
use crate::auth::roles::Permission;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Faculty, FacultyInput, RejectedAsset};
use crate::services::faculty_service::{FacultyFilter, FacultyStats};
use crate::state::AppState;

/// POST /api/faculty/save
pub async fn faculty_save(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<FacultyInput>, JsonRejection>,
) -> ApiResult<Faculty> {
    let actor = user.require(Permission::EditFaculty)?;
    let Json(input) = payload?;
    let faculty = state.faculty.save_faculty(input, &actor).await?;
    Ok(ApiResponse::created(faculty).message("Faculty saved for verification"))
}

/// PUT /api/faculty/:id - edits send the profile back for verification
pub async fn faculty_put(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<FacultyInput>, JsonRejection>,
) -> ApiResult<Faculty> {
    let actor = user.require(Permission::EditFaculty)?;
    let Json(input) = payload?;
    Ok(ApiResponse::success(state.faculty.update_faculty(id, input, &actor).await?))
}

/// GET /api/faculty?faculty_type=&status=&name=&domain=
pub async fn faculty_list(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<FacultyFilter>,
) -> ApiResult<Vec<Faculty>> {
    user.require(Permission::ReadFaculty)?;
    Ok(ApiResponse::success(state.faculty.list_faculty(&filter).await?))
}

/// GET /api/faculty/stats
pub async fn faculty_stats(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<FacultyStats> {
    user.require(Permission::ReadFaculty)?;
    Ok(ApiResponse::success(state.faculty.faculty_stats().await?))
}

/// GET /api/faculty/:id
pub async fn faculty_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Faculty> {
    user.require(Permission::ReadFaculty)?;
    Ok(ApiResponse::success(state.faculty.get_faculty(id).await?))
}

/// POST /api/faculty/:id/approve
pub async fn faculty_approve(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Faculty> {
    let actor = user.require(Permission::ApproveFaculty)?;
    let faculty = state.faculty.approve_faculty(id, &actor).await?;
    Ok(ApiResponse::success(faculty).message("Faculty approved"))
}

/// POST /api/faculty/:id/reject
pub async fn faculty_reject(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<RejectBody>, JsonRejection>,
) -> ApiResult<RejectedAsset> {
    let actor = user.require(Permission::ApproveFaculty)?;
    let Json(body) = payload?;
    let record = state.faculty.reject_faculty(id, &body.remarks, &actor).await?;
    Ok(ApiResponse::success(record).message("Faculty rejected"))
}

/// DELETE /api/faculty/:id
pub async fn faculty_delete(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let actor = user.require(Permission::ApproveFaculty)?;
    state.faculty.delete_faculty(id, &actor).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
