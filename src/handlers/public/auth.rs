// handlers/public/auth.rs - POST /auth/register, POST /auth/login

use axum::{extract::rejection::JsonRejection, Extension, Json};

use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{PublicUser, RegisterUser};
use crate::services::user_service::{LoginRequest, LoginResponse};
use crate::state::AppState;

/// POST /auth/register - request an account; an administrator approves it
pub async fn register_post(
    Extension(state): Extension<AppState>,
    payload: Result<Json<RegisterUser>, JsonRejection>,
) -> ApiResult<PublicUser> {
    let Json(input) = payload?;
    let user = state.users.register(input).await?;
    Ok(ApiResponse::created(user).message("Registration received, awaiting approval"))
}

/// POST /auth/login - exchange name and password for a JWT
pub async fn login_post(
    Extension(state): Extension<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let session = state.users.login(request).await?;
    Ok(ApiResponse::success(session))
}
