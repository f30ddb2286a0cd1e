// handlers/protected/users.rs - /api/users (administrators only)

use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::roles::Permission;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::PublicUser;
use crate::services::user_service::{SetAccess, UserFilter};
use crate::state::AppState;

/// GET /api/users?status=&role=
pub async fn users_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Vec<PublicUser>> {
    user.require(Permission::ManageUsers)?;
    Ok(ApiResponse::success(state.users.list_users(&filter).await?))
}

/// POST /api/users/:id/approve
pub async fn user_approve(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<PublicUser> {
    let actor = user.require(Permission::ManageUsers)?;
    let approved = state.users.approve_user(id, &actor).await?;
    Ok(ApiResponse::success(approved).message("User approved"))
}

/// PUT /api/users/:id/access - change role and access areas
pub async fn user_access_put(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<SetAccess>, JsonRejection>,
) -> ApiResult<PublicUser> {
    let actor = user.require(Permission::ManageUsers)?;
    let Json(change) = payload?;
    Ok(ApiResponse::success(state.users.set_access(id, change, &actor).await?))
}

/// DELETE /api/users/:id
pub async fn user_delete(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let actor = user.require(Permission::ManageUsers)?;
    state.users.remove_user(id, &actor).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
