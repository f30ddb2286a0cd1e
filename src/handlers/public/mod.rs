// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service info, store health and token acquisition.
// Route Prefix: none (/, /health, /auth/*)

pub mod auth;
pub mod root;

pub use auth::{login_post, register_post};
pub use root::{health_get, root_get};
