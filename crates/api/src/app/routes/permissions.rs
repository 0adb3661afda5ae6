//! Permission endpoints.
//!
//! `GET /permissions/:subject_id` and `PUT /permissions/batch-update` keep the
//! `{ success, ... }` shapes the console screens and the mobile app consume.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use bizconsole_auth::{PermissionMatrix, toggles_to_raw};
use bizconsole_core::SubjectId;

use crate::app::dto::{
    BatchUpdateRequest, ExplainQuery, MessageResponse, PermissionsResponse,
    SessionPermissionsResponse,
};
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/batch-update", put(batch_update))
        .route("/:subject_id", get(get_permissions).delete(delete_permissions))
        .route("/:subject_id/matrix", get(get_matrix))
}

fn parse_subject(raw: &str) -> Result<SubjectId, axum::response::Response> {
    SubjectId::parse(raw).map_err(|e| errors::failure(StatusCode::BAD_REQUEST, e.to_string()))
}

/// Parse the path id and apply the read rule shared by every endpoint that
/// returns another subject's grants.
fn readable_subject(
    principal: &PrincipalContext,
    raw: &str,
) -> Result<SubjectId, axum::response::Response> {
    let subject_id = parse_subject(raw)?;
    if !principal.may_read_grants_of(&subject_id) {
        return Err(errors::forbidden(
            "only administrators may read another subject's permissions",
        ));
    }
    Ok(subject_id)
}

/// GET /permissions/:subject_id
pub async fn get_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(subject_id): Path<String>,
) -> axum::response::Response {
    let subject_id = match readable_subject(&principal, &subject_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.grants.get_grants(&subject_id).await {
        Ok(grants) => (StatusCode::OK, Json(PermissionsResponse::from(&grants))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PUT /permissions/batch-update - full replacement of a subject's grants.
pub async fn batch_update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<BatchUpdateRequest>, JsonRejection>,
) -> axum::response::Response {
    if !principal.is_administrator() {
        return errors::forbidden("only administrators may update permissions");
    }
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return errors::failure(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let raw = toggles_to_raw(&req.permissions);
    match services.grants.batch_set_grants(&req.subject_id, &raw).await {
        Ok(outcome) => {
            let message = if outcome.dropped.is_empty() {
                "permissions updated".to_string()
            } else {
                format!(
                    "permissions updated ({} invalid entries ignored)",
                    outcome.dropped.len()
                )
            };
            (StatusCode::OK, Json(MessageResponse::ok(message))).into_response()
        }
        Err(e) => errors::batch_error_to_response(e),
    }
}

/// DELETE /permissions/:subject_id - drop every grant of a deleted subject.
pub async fn delete_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(subject_id): Path<String>,
) -> axum::response::Response {
    if !principal.is_administrator() {
        return errors::forbidden("only administrators may delete permissions");
    }
    let subject_id = match parse_subject(&subject_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.grants.delete_subject(&subject_id).await {
        Ok(()) => (StatusCode::OK, Json(MessageResponse::ok("permissions deleted"))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /permissions/:subject_id/matrix - seed state for the grant editor.
pub async fn get_matrix(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(subject_id): Path<String>,
) -> axum::response::Response {
    let subject_id = match readable_subject(&principal, &subject_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.grants.get_grants(&subject_id).await {
        Ok(grants) => {
            let matrix = PermissionMatrix::seed(services.taxonomy(), &grants);
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "success": true,
                    "subjectId": subject_id,
                    "version": services.taxonomy().version(),
                    "matrix": matrix,
                })),
            )
                .into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /me/permissions - the caller's own grants (session bootstrap).
pub async fn session_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let subject = principal.subject();
    match services.grants.get_grants(&subject.id).await {
        Ok(grants) => {
            let body = SessionPermissionsResponse {
                success: true,
                subject_id: subject.id.to_string(),
                administrator: subject.is_administrator(),
                permissions: PermissionsResponse::from(&grants).permissions,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /me/permissions/explain?key=X&action=Y - why the caller can/cannot.
pub async fn explain(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    query: Result<Query<ExplainQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            return errors::failure(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };
    let evaluator = match services.grants.evaluator_for(principal.subject().clone()).await {
        Ok(eval) => eval,
        Err(e) => return errors::store_error_to_response(e),
    };

    let decision = evaluator.explain(&query.key, &query.action);
    tracing::debug!(
        key = %decision.key,
        action = %decision.action,
        granted = decision.granted,
        "permission explained"
    );

    (
        StatusCode::OK,
        Json(serde_json::json!({ "success": true, "decision": decision })),
    )
        .into_response()
}
