// handlers/protected/assets/purchases.rs - purchase entry and approval

use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::roles::Permission;
use crate::handlers::protected::RejectBody;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Asset, CreatePurchase, RejectedAsset};
use crate::services::purchase_service::PurchaseFilter;
use crate::state::AppState;

/// POST /api/assets/store - enter a purchase bill for approval
pub async fn store_post(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreatePurchase>, JsonRejection>,
) -> ApiResult<Asset> {
    let actor = user.require(Permission::SubmitPurchase)?;
    let Json(input) = payload?;
    let asset = state.purchases.store_purchase(input, &actor).await?;
    Ok(ApiResponse::created(asset).message("Purchase stored for approval"))
}

/// GET /api/assets/purchases?status=&asset_type=&asset_category=
pub async fn purchases_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<PurchaseFilter>,
) -> ApiResult<Vec<Asset>> {
    user.require(Permission::ReadAssets)?;
    Ok(ApiResponse::success(state.purchases.list_purchases(&filter).await?))
}

/// GET /api/assets/purchases/:id
pub async fn purchase_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Asset> {
    user.require(Permission::ReadAssets)?;
    Ok(ApiResponse::success(state.purchases.get_purchase(id).await?))
}

/// POST /api/assets/approve/:id
pub async fn purchase_approve(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Asset> {
    let actor = user.require(Permission::ApproveAssets)?;
    let asset = state.purchases.approve_purchase(id, &actor).await?;
    Ok(ApiResponse::success(asset).message("Purchase approved and added to stock"))
}

/// POST /api/assets/reject/:id
pub async fn purchase_reject(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<RejectBody>, JsonRejection>,
) -> ApiResult<RejectedAsset> {
    let actor = user.require(Permission::ApproveAssets)?;
    let Json(body) = payload?;
    let record = state.purchases.reject_purchase(id, &body.remarks, &actor).await?;
    Ok(ApiResponse::success(record).message("Purchase rejected"))
}
