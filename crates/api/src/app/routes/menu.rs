use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};

use crate::app::{dto::MenuResponse, services::AppServices};

/// GET /menu - the flattened taxonomy, for rendering the grant editor.
pub async fn taxonomy(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let taxonomy = services.taxonomy();
    Json(MenuResponse {
        version: taxonomy.version(),
        entries: taxonomy.flatten(),
    })
    .into_response()
}
