// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware injects `AuthUser`; each handler checks
// its own permission through `AuthUser::require`.

pub mod assets;
pub mod auth;
pub mod faculty;
pub mod users;

use serde::Deserialize;

/// Body of every reject endpoint
#[derive(Debug, Deserialize)]
pub struct RejectBody {
    #[serde(default)]
    pub remarks: String,
}
