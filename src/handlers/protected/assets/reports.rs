// handlers/protected/assets/reports.rs - read-only views

use axum::{extract::Query, Extension};
use serde::Deserialize;

use crate::auth::roles::Permission;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{RejectedAsset, RejectionSource, StockEntry};
use crate::services::report_service::{CategorySummary, PendingCounts, StockFilter};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RejectedQuery {
    pub source: Option<RejectionSource>,
}

/// GET /api/assets/rejected?source=purchase|issue|return|disposal|faculty
pub async fn rejected_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<RejectedQuery>,
) -> ApiResult<Vec<RejectedAsset>> {
    user.require(Permission::ReadAssets)?;
    Ok(ApiResponse::success(state.reports.list_rejected(query.source).await?))
}

/// GET /api/assets/stock?asset_type=&asset_category=&item_name=
pub async fn stock_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<StockFilter>,
) -> ApiResult<Vec<StockEntry>> {
    user.require(Permission::ReadAssets)?;
    Ok(ApiResponse::success(state.reports.stock(&filter).await?))
}

/// GET /api/assets/summary
pub async fn summary_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<CategorySummary>> {
    user.require(Permission::ReadAssets)?;
    Ok(ApiResponse::success(state.reports.asset_summary().await?))
}

/// GET /api/assets/pending - queue sizes for approver dashboards
pub async fn pending_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<PendingCounts> {
    user.require(Permission::ReadAssets)?;
    Ok(ApiResponse::success(state.reports.pending_counts().await?))
}
