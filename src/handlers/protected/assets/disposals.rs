// handlers/protected/assets/disposals.rs - condemnation requests

use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::roles::Permission;
use crate::handlers::protected::RejectBody;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{CreateDisposal, DisposalRequest, RejectedAsset};
use crate::services::disposal_service::DisposalFilter;
use crate::state::AppState;

/// POST /api/assets/dispose
pub async fn dispose_post(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateDisposal>, JsonRejection>,
) -> ApiResult<DisposalRequest> {
    let actor = user.require(Permission::RequestMovement)?;
    let Json(input) = payload?;
    let disposal = state.disposals.request_disposal(input, &actor).await?;
    Ok(ApiResponse::created(disposal).message("Disposal awaiting approval"))
}

/// POST /api/assets/dispose/:id/approve
pub async fn dispose_approve(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<DisposalRequest> {
    let actor = user.require(Permission::ApproveAssets)?;
    let disposal = state.disposals.approve_disposal(id, &actor).await?;
    Ok(ApiResponse::success(disposal).message("Disposal approved"))
}

/// POST /api/assets/dispose/:id/reject
pub async fn dispose_reject(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<RejectBody>, JsonRejection>,
) -> ApiResult<RejectedAsset> {
    let actor = user.require(Permission::ApproveAssets)?;
    let Json(body) = payload?;
    let record = state.disposals.reject_disposal(id, &body.remarks, &actor).await?;
    Ok(ApiResponse::success(record).message("Disposal rejected"))
}

/// GET /api/assets/disposals?status=&source=
pub async fn disposals_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<DisposalFilter>,
) -> ApiResult<Vec<DisposalRequest>> {
    user.require(Permission::ReadAssets)?;
    Ok(ApiResponse::success(state.disposals.list_disposals(&filter).await?))
}
