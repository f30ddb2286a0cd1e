// handlers/protected/assets/issues.rs - store-to-location issues

use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::roles::Permission;
use crate::handlers::protected::RejectBody;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{CreateIssue, IssuedRecord, RejectedAsset, TempIssue};
use crate::services::issue_service::{AvailableIds, IssueFilter};
use crate::state::AppState;
use crate::types::ItemKey;

#[derive(Debug, Default, Deserialize)]
pub struct AcknowledgeBody {
    #[serde(default)]
    pub receipt_url: Option<String>,
}

/// POST /api/assets/issue
pub async fn issue_post(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateIssue>, JsonRejection>,
) -> ApiResult<TempIssue> {
    let actor = user.require(Permission::RequestMovement)?;
    let Json(input) = payload?;
    let issue = state.issues.issue(input, &actor).await?;
    Ok(ApiResponse::created(issue).message("Issue awaiting acknowledgement and approval"))
}

/// POST /api/assets/issue/:id/acknowledge - attach the signed receipt
pub async fn issue_acknowledge(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<AcknowledgeBody>, JsonRejection>,
) -> ApiResult<TempIssue> {
    let actor = user.require(Permission::AcknowledgeIssue)?;
    let Json(body) = payload?;
    let issue = state.issues.acknowledge_issue(id, body.receipt_url, &actor).await?;
    Ok(ApiResponse::success(issue).message("Issue acknowledged"))
}

/// POST /api/assets/issue/:id/approve
pub async fn issue_approve(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<TempIssue> {
    let actor = user.require(Permission::ApproveAssets)?;
    let issue = state.issues.approve_issue(id, &actor).await?;
    Ok(ApiResponse::success(issue).message("Issue approved"))
}

/// POST /api/assets/issue/:id/reject
pub async fn issue_reject(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<RejectBody>, JsonRejection>,
) -> ApiResult<RejectedAsset> {
    let actor = user.require(Permission::ApproveAssets)?;
    let Json(body) = payload?;
    let record = state.issues.reject_issue(id, &body.remarks, &actor).await?;
    Ok(ApiResponse::success(record).message("Issue rejected"))
}

/// GET /api/assets/issues?status=&location=
pub async fn issues_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<IssueFilter>,
) -> ApiResult<Vec<TempIssue>> {
    user.require(Permission::ReadAssets)?;
    Ok(ApiResponse::success(state.issues.list_issues(&filter).await?))
}

/// GET /api/assets/issued?location=&asset_category=
pub async fn issued_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<IssueFilter>,
) -> ApiResult<Vec<IssuedRecord>> {
    user.require(Permission::ReadAssets)?;
    Ok(ApiResponse::success(state.issues.list_issued(&filter).await?))
}

/// GET /api/assets/available-ids?asset_type=&asset_category=&item_name=...
pub async fn available_ids_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(key): Query<ItemKey>,
) -> ApiResult<AvailableIds> {
    user.require(Permission::ReadAssets)?;
    Ok(ApiResponse::success(state.issues.available_ids(key).await?))
}
