// handlers/protected/assets/updates.rs - edits of approved purchases

use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::roles::Permission;
use crate::handlers::protected::RejectBody;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::PendingUpdate;
use crate::services::update_service::{UpdateFilter, UpdateRequest};
use crate::state::AppState;

/// POST /api/assets/update - propose new data for an approved purchase
pub async fn update_post(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> ApiResult<PendingUpdate> {
    let actor = user.require(Permission::RequestMovement)?;
    let Json(request) = payload?;
    let update = state.updates.request_update(request, &actor).await?;
    Ok(ApiResponse::created(update).message("Update awaiting approval"))
}

/// POST /api/assets/update/:id/approve
pub async fn update_approve(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<PendingUpdate> {
    let actor = user.require(Permission::ApproveAssets)?;
    let update = state.updates.approve_update(id, &actor).await?;
    Ok(ApiResponse::success(update).message("Update applied"))
}

/// POST /api/assets/update/:id/reject
pub async fn update_reject(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<RejectBody>, JsonRejection>,
) -> ApiResult<PendingUpdate> {
    let actor = user.require(Permission::ApproveAssets)?;
    let Json(body) = payload?;
    let update = state.updates.reject_update(id, &body.remarks, &actor).await?;
    Ok(ApiResponse::success(update).message("Update rejected"))
}

/// GET /api/assets/updates?status=&asset_id=
pub async fn updates_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<UpdateFilter>,
) -> ApiResult<Vec<PendingUpdate>> {
    user.require(Permission::ReadAssets)?;
    Ok(ApiResponse::success(state.updates.list_updates(&filter).await?))
}
