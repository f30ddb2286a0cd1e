// handlers/protected/assets/returns.rs - returns and servicing

use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::roles::Permission;
use crate::handlers::protected::RejectBody;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{CreateReturn, RejectedAsset, ReturnRequest, ServiceRecord};
use crate::services::return_service::{ReturnFilter, ServiceFilter};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CompleteServiceBody {
    #[serde(default)]
    pub service_notes: Option<String>,
}

/// POST /api/assets/return
pub async fn return_post(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateReturn>, JsonRejection>,
) -> ApiResult<ReturnRequest> {
    let actor = user.require(Permission::RequestMovement)?;
    let Json(input) = payload?;
    let request = state.returns.request_return(input, &actor).await?;
    Ok(ApiResponse::created(request).message("Return awaiting approval"))
}

/// POST /api/assets/return/:id/approve
pub async fn return_approve(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<ReturnRequest> {
    let actor = user.require(Permission::ApproveAssets)?;
    let request = state.returns.approve_return(id, &actor).await?;
    Ok(ApiResponse::success(request).message("Return approved"))
}

/// POST /api/assets/return/:id/reject
pub async fn return_reject(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<RejectBody>, JsonRejection>,
) -> ApiResult<RejectedAsset> {
    let actor = user.require(Permission::ApproveAssets)?;
    let Json(body) = payload?;
    let record = state.returns.reject_return(id, &body.remarks, &actor).await?;
    Ok(ApiResponse::success(record).message("Return rejected"))
}

/// GET /api/assets/returns?status=&location=&condition=
pub async fn returns_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<ReturnFilter>,
) -> ApiResult<Vec<ReturnRequest>> {
    user.require(Permission::ReadAssets)?;
    Ok(ApiResponse::success(state.returns.list_returns(&filter).await?))
}

/// POST /api/assets/service/:id/complete
pub async fn service_complete(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<CompleteServiceBody>, JsonRejection>,
) -> ApiResult<ServiceRecord> {
    let actor = user.require(Permission::CompleteService)?;
    let Json(body) = payload?;
    let record = state.returns.complete_service(id, body.service_notes, &actor).await?;
    Ok(ApiResponse::success(record).message("Service completed, items returned to stock"))
}

/// GET /api/assets/services?service_status=
pub async fn services_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<ServiceFilter>,
) -> ApiResult<Vec<ServiceRecord>> {
    user.require(Permission::ReadAssets)?;
    Ok(ApiResponse::success(state.returns.list_services(&filter).await?))
}
