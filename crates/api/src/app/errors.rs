use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use bizconsole_infra::{BatchSetError, GrantStoreError};

/// `{ success: false, message }` body expected by the permission screens.
pub fn failure(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn batch_error_to_response(err: BatchSetError) -> axum::response::Response {
    match err {
        BatchSetError::Validation(e) => failure(StatusCode::BAD_REQUEST, e.to_string()),
        BatchSetError::Storage(e) => store_error_to_response(e),
    }
}

pub fn store_error_to_response(err: GrantStoreError) -> axum::response::Response {
    tracing::error!("grant store failure: {err}");
    failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

pub fn forbidden(message: impl Into<String>) -> axum::response::Response {
    failure(StatusCode::FORBIDDEN, message)
}
