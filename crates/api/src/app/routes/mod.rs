use axum::{routing::get, Router};

pub mod menu;
pub mod permissions;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/menu", get(menu::taxonomy))
        .route("/me/permissions", get(permissions::session_permissions))
        .route("/me/permissions/explain", get(permissions::explain))
        .nest("/permissions", permissions::router())
}
