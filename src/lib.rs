pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod inventory;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod types;

#[cfg(test)]
pub mod testing;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full HTTP application: public routes, JWT-protected `/api` routes and global layers
pub fn app(state: AppState) -> Router {
    let settings = config::config();

    let protected = Router::new()
        .merge(auth_routes())
        .merge(asset_routes())
        .merge(faculty_routes())
        .merge(user_routes())
        .route_layer(axum::middleware::from_fn(jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(handlers::public::root_get))
        .route("/health", get(handlers::public::health_get))
        .merge(auth_public_routes())
        // Protected API
        .merge(protected)
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&settings.security))
                .layer(DefaultBodyLimit::max(settings.api.max_request_size_bytes)),
        )
        .layer(Extension(state))
}

fn cors_layer(security: &config::SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

fn auth_public_routes() -> Router {
    use axum::routing::post;
    use handlers::public::{login_post, register_post};

    Router::new()
        .route("/auth/register", post(register_post))
        .route("/auth/login", post(login_post))
}

fn auth_routes() -> Router {
    use handlers::protected::auth;

    Router::new().route("/api/auth/whoami", get(auth::whoami_get))
}

fn asset_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::assets::{disposals, issues, purchases, reports, returns, updates};

    Router::new()
        // Purchases
        .route("/api/assets/store", post(purchases::store_post))
        .route("/api/assets/purchases", get(purchases::purchases_get))
        .route("/api/assets/purchases/:id", get(purchases::purchase_get))
        .route("/api/assets/approve/:id", post(purchases::purchase_approve))
        .route("/api/assets/reject/:id", post(purchases::purchase_reject))
        // Issues
        .route("/api/assets/issue", post(issues::issue_post))
        .route("/api/assets/issue/:id/acknowledge", post(issues::issue_acknowledge))
        .route("/api/assets/issue/:id/approve", post(issues::issue_approve))
        .route("/api/assets/issue/:id/reject", post(issues::issue_reject))
        .route("/api/assets/issues", get(issues::issues_get))
        .route("/api/assets/issued", get(issues::issued_get))
        .route("/api/assets/available-ids", get(issues::available_ids_get))
        // Returns and servicing
        .route("/api/assets/return", post(returns::return_post))
        .route("/api/assets/return/:id/approve", post(returns::return_approve))
        .route("/api/assets/return/:id/reject", post(returns::return_reject))
        .route("/api/assets/returns", get(returns::returns_get))
        .route("/api/assets/service/:id/complete", post(returns::service_complete))
        .route("/api/assets/services", get(returns::services_get))
        // Disposals
        .route("/api/assets/dispose", post(disposals::dispose_post))
        .route("/api/assets/dispose/:id/approve", post(disposals::dispose_approve))
        .route("/api/assets/dispose/:id/reject", post(disposals::dispose_reject))
        .route("/api/assets/disposals", get(disposals::disposals_get))
        // Updates to approved purchases
        .route("/api/assets/update", post(updates::update_post))
        .route("/api/assets/update/:id/approve", post(updates::update_approve))
        .route("/api/assets/update/:id/reject", post(updates::update_reject))
        .route("/api/assets/updates", get(updates::updates_get))
        // Reports
        .route("/api/assets/rejected", get(reports::rejected_get))
        .route("/api/assets/stock", get(reports::stock_get))
        .route("/api/assets/summary", get(reports::summary_get))
        .route("/api/assets/pending", get(reports::pending_get))
}

fn faculty_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::faculty;

    Router::new()
        .route("/api/faculty", get(faculty::faculty_list))
        .route("/api/faculty/save", post(faculty::faculty_save))
        .route("/api/faculty/stats", get(faculty::faculty_stats))
        .route(
            "/api/faculty/:id",
            get(faculty::faculty_get)
                .put(faculty::faculty_put)
                .delete(faculty::faculty_delete),
        )
        .route("/api/faculty/:id/approve", post(faculty::faculty_approve))
        .route("/api/faculty/:id/reject", post(faculty::faculty_reject))
}

fn user_routes() -> Router {
    use axum::routing::{post, put};
    use handlers::protected::users;

    Router::new()
        .route("/api/users", get(users::users_get))
        .route("/api/users/:id", axum::routing::delete(users::user_delete))
        .route("/api/users/:id/approve", post(users::user_approve))
        .route("/api/users/:id/access", put(users::user_access_put))
}
