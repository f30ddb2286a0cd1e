// handlers/public/root.rs - GET / and GET /health

use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service description and endpoint map
pub async fn root_get() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "CASFOS Asset & Faculty Management API",
            "version": version,
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/auth/register, /auth/login (public - token acquisition)",
                "auth": "/api/auth/whoami (protected)",
                "assets": "/api/assets/* (protected - purchases, issues, returns, disposals, updates, reports)",
                "faculty": "/api/faculty[/:id] (protected)",
                "users": "/api/users[/:id] (protected - admin only)",
            }
        }
    }))
}

/// GET /health - 503 when the document store is unreachable
pub async fn health_get(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": backend
                }
            })),
        ),
        Err(e) => {
            tracing::error!(store = backend, error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "store unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "store": backend
                    }
                })),
            )
        }
    }
}
