use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Extension,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::roles::{permits, AccessArea, Permission, Role};
use crate::auth::validate_jwt;
use crate::error::ApiError;
use crate::models::PublicUser;
use crate::services::Actor;
use crate::state::AppState;

/// Authenticated user context: the token's subject, with role and access as currently stored
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
    pub access: Vec<AccessArea>,
}

impl From<PublicUser> for AuthUser {
    fn from(user: PublicUser) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
            role: user.role,
            access: user.access,
        }
    }
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.name.clone(), self.role)
    }

    /// The acting user, or 403 when the role or area grant is missing
    pub fn require(&self, permission: Permission) -> Result<Actor, ApiError> {
        if permits(self.role, &self.access, permission) {
            Ok(self.actor())
        } else {
            tracing::debug!(user = %self.name, role = self.role.as_str(), ?permission, "Permission denied");
            Err(ApiError::forbidden(format!(
                "Role {} is not allowed to perform this action",
                self.role.as_str()
            )))
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract JWT from Authorization header
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    // Validate and decode JWT
    let claims = validate_jwt(&token).map_err(ApiError::from)?;

    // role and access come from the stored account, not the token
    let user = state.users.session_user(claims.sub).await?;
    request.extensions_mut().insert(AuthUser::from(user));

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
