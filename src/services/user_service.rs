use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::{require_text, Actor, ServiceContext, ServiceError, ServiceResult};
use crate::auth::roles::{AccessArea, Role};
use crate::auth::{self, Claims};
use crate::config;
use crate::models::{PublicUser, RegisterUser, User};
use crate::store::{DocFilter, Repository};
use crate::types::ApprovalStatus;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// Body of `PUT /api/users/:id/access`
#[derive(Debug, Clone, Deserialize)]
pub struct SetAccess {
    pub role: Role,
    #[serde(default)]
    pub access: Vec<AccessArea>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub status: Option<ApprovalStatus>,
    pub role: Option<Role>,
}

/// Staff accounts: self-registration, admin approval, login
#[derive(Clone)]
pub struct UserService {
    ctx: ServiceContext,
    users: Repository<User>,
}

impl UserService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { users: ctx.repo(), ctx }
    }

    /// Self-registration; the account waits for an administrator
    pub async fn register(&self, input: RegisterUser) -> ServiceResult<PublicUser> {
        if input.role == Role::Admin {
            return Err(ServiceError::Forbidden(
                "Administrator accounts cannot be self-registered".to_string(),
            ));
        }
        let user = build_user(input, ApprovalStatus::Pending)?;
        self.insert_unique(&user).await?;

        info!(user = %user.name, role = user.role.as_str(), "User registered, awaiting approval");
        Ok(PublicUser::from(&user))
    }

    /// Bootstrap path used by the CLI and tests: the account is approved at once
    pub async fn create_user(&self, input: RegisterUser) -> ServiceResult<PublicUser> {
        let user = build_user(input, ApprovalStatus::Approved)?;
        self.insert_unique(&user).await?;

        info!(user = %user.name, role = user.role.as_str(), "User created");
        Ok(PublicUser::from(&user))
    }

    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        let name = request.name.trim();
        let user = match self.find_by_name(name).await? {
            Some(user) if auth::verify_password(&request.password, &user.password_hash) => user,
            _ => {
                warn!(user = %name, "Failed login attempt");
                return Err(ServiceError::Unauthorized("Invalid name or password".to_string()));
            }
        };

        if user.status != ApprovalStatus::Approved {
            return Err(ServiceError::Forbidden(format!(
                "Account {} is {} and cannot log in yet",
                user.name, user.status
            )));
        }

        let claims = Claims::new(user.id, user.name.clone(), user.role, user.access.clone());
        let token = auth::generate_jwt(&claims).map_err(|e| ServiceError::Internal(e.to_string()))?;

        info!(user = %user.name, "User logged in");
        Ok(LoginResponse {
            token,
            user: PublicUser::from(&user),
            expires_in: config::config().security.jwt_expiry_hours as i64 * 3600,
        })
    }

    pub async fn approve_user(&self, id: Uuid, actor: &Actor) -> ServiceResult<PublicUser> {
        let mut user = self.users.select_404(id).await?;
        if user.status != ApprovalStatus::Pending {
            return Err(ServiceError::InvalidState(format!("User {} is already {}", user.name, user.status)));
        }
        user.status = ApprovalStatus::Approved;
        user.updated_at = Utc::now();
        self.users.replace(&user).await?;

        info!(user = %user.name, admin = %actor.name, "User approved");
        Ok(PublicUser::from(&user))
    }

    pub async fn set_access(&self, id: Uuid, change: SetAccess, actor: &Actor) -> ServiceResult<PublicUser> {
        let mut user = self.users.select_404(id).await?;
        if user.id == actor.user_id && change.role != Role::Admin {
            return Err(ServiceError::InvalidState("Administrators cannot demote themselves".to_string()));
        }
        user.role = change.role;
        user.access = dedup_access(change.access);
        user.updated_at = Utc::now();
        self.users.replace(&user).await?;

        info!(user = %user.name, role = user.role.as_str(), admin = %actor.name, "User access changed");
        Ok(PublicUser::from(&user))
    }

    pub async fn remove_user(&self, id: Uuid, actor: &Actor) -> ServiceResult<()> {
        if id == actor.user_id {
            return Err(ServiceError::InvalidState("Administrators cannot remove themselves".to_string()));
        }
        if !self.users.delete(id).await? {
            return Err(ServiceError::NotFound(format!("User {} not found", id)));
        }
        info!(user = %id, admin = %actor.name, "User removed");
        Ok(())
    }

    pub async fn list_users(&self, filter: &UserFilter) -> ServiceResult<Vec<PublicUser>> {
        let filter = DocFilter::new()
            .eq_opt("status", filter.status.map(|s| s.as_str()))
            .eq_opt("role", filter.role.map(|r| r.as_str()));
        Ok(self.users.select_any(&filter).await?.iter().map(PublicUser::from).collect())
    }

    pub async fn get_user(&self, id: Uuid) -> ServiceResult<PublicUser> {
        Ok(PublicUser::from(&self.users.select_404(id).await?))
    }

    /// The account behind a token, as it stands now. Removed or unapproved accounts lose their session.
    pub async fn session_user(&self, id: Uuid) -> ServiceResult<PublicUser> {
        match self.users.select_one(id).await? {
            Some(user) if user.status == ApprovalStatus::Approved => Ok(PublicUser::from(&user)),
            Some(user) => Err(ServiceError::Unauthorized(format!("Account {} is {}", user.name, user.status))),
            None => Err(ServiceError::Unauthorized("Account no longer exists".to_string())),
        }
    }

    async fn find_by_name(&self, name: &str) -> ServiceResult<Option<User>> {
        Ok(self.users.select_first(&DocFilter::new().eq("name", name)).await?)
    }

    async fn insert_unique(&self, user: &User) -> ServiceResult<()> {
        let _guard = self.ctx.lock.lock().await;
        if self.find_by_name(&user.name).await?.is_some() {
            return Err(ServiceError::Conflict(format!("User {} already exists", user.name)));
        }
        self.users.insert(user).await?;
        Ok(())
    }
}

fn build_user(input: RegisterUser, status: ApprovalStatus) -> ServiceResult<User> {
    let name = require_text(&input.name, "Name")?;
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let password_hash = auth::hash_password(&input.password).map_err(|e| ServiceError::Internal(e.to_string()))?;
    let now = Utc::now();
    Ok(User {
        id: Uuid::new_v4(),
        name,
        password_hash,
        role: input.role,
        access: dedup_access(input.access),
        status,
        created_at: now,
        updated_at: now,
    })
}

fn dedup_access(mut access: Vec<AccessArea>) -> Vec<AccessArea> {
    let mut seen = Vec::new();
    access.retain(|a| {
        if seen.contains(a) {
            false
        } else {
            seen.push(*a);
            true
        }
    });
    access
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestServices;

    fn registration(name: &str, role: Role) -> RegisterUser {
        RegisterUser {
            name: name.to_string(),
            password: "secret-pass".to_string(),
            role,
            access: vec![AccessArea::Asset, AccessArea::Asset],
        }
    }

    fn login(name: &str, password: &str) -> LoginRequest {
        LoginRequest { name: name.to_string(), password: password.to_string() }
    }

    #[tokio::test]
    async fn pending_user_cannot_log_in_until_approved() {
        let t = TestServices::new();
        let user = t.users.register(registration("keeper2", Role::Storekeeper)).await.unwrap();
        assert_eq!(user.access, vec![AccessArea::Asset]);

        let res = t.users.login(login("keeper2", "secret-pass")).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(_))));

        t.users.approve_user(user.id, &t.admin).await.unwrap();
        let session = t.users.login(login("keeper2", "secret-pass")).await.unwrap();
        let claims = auth::validate_jwt(&session.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Storekeeper);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let t = TestServices::new();
        t.users.create_user(registration("clerk2", Role::DataEntry)).await.unwrap();
        let res = t.users.login(login("clerk2", "not-the-password")).await;
        assert!(matches!(res, Err(ServiceError::Unauthorized(_))));
        let res = t.users.login(login("nobody", "secret-pass")).await;
        assert!(matches!(res, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn admin_cannot_self_register_and_names_are_unique() {
        let t = TestServices::new();
        let res = t.users.register(registration("boss", Role::Admin)).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(_))));

        t.users.register(registration("viewer1", Role::Viewer)).await.unwrap();
        let dup = t.users.register(registration("viewer1", Role::Viewer)).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn set_access_changes_role_and_areas() {
        let t = TestServices::new();
        let user = t.users.create_user(registration("v2", Role::Viewer)).await.unwrap();
        let changed = t
            .users
            .set_access(
                user.id,
                SetAccess { role: Role::Principal, access: vec![AccessArea::Faculty] },
                &t.admin,
            )
            .await
            .unwrap();
        assert_eq!(changed.role, Role::Principal);
        assert_eq!(changed.access, vec![AccessArea::Faculty]);
    }

    #[tokio::test]
    async fn concurrent_registrations_of_one_name_leave_one_account() {
        let t = TestServices::new();
        let (a, b) = tokio::join!(
            t.users.register(registration("twin", Role::Viewer)),
            t.users.register(registration("twin", Role::Viewer)),
        );
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);

        let all = t.users.list_users(&UserFilter::default()).await.unwrap();
        assert_eq!(all.iter().filter(|u| u.name == "twin").count(), 1);
    }

    #[tokio::test]
    async fn session_ends_when_account_is_removed() {
        let t = TestServices::new();
        let user = t.users.create_user(registration("clerk3", Role::DataEntry)).await.unwrap();
        assert_eq!(t.users.session_user(user.id).await.unwrap().role, Role::DataEntry);

        t.users.remove_user(user.id, &t.admin).await.unwrap();
        let res = t.users.session_user(user.id).await;
        assert!(matches!(res, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn session_reflects_the_stored_role() {
        let t = TestServices::new();
        let user = t.users.create_user(registration("keeper3", Role::Storekeeper)).await.unwrap();
        t.users
            .set_access(user.id, SetAccess { role: Role::Viewer, access: vec![] }, &t.admin)
            .await
            .unwrap();

        let session = t.users.session_user(user.id).await.unwrap();
        assert_eq!(session.role, Role::Viewer);
        assert!(session.access.is_empty());

        let pending = t.users.register(registration("newcomer", Role::Viewer)).await.unwrap();
        assert!(matches!(t.users.session_user(pending.id).await, Err(ServiceError::Unauthorized(_))));
    }
}
