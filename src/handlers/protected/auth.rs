// handlers/protected/auth.rs - GET /api/auth/whoami

use axum::Extension;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::PublicUser;
use crate::state::AppState;

/// GET /api/auth/whoami - the stored account behind the bearer token
pub async fn whoami_get(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<PublicUser> {
    let account = state.users.get_user(user.user_id).await?;
    Ok(ApiResponse::success(account))
}
