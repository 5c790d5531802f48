//! Per-workspace authorization guards.
//!
//! Route groups are wrapped with a required access level. The guard
//! resolves the caller's effective level under a deadline and fails
//! closed: a timed-out or errored resolution is a 500, never a grant.
//! The resolved level lands in request extensions for the handler.

use std::collections::HashMap;
use std::sync::Arc;

use atelier_core::models::{AccessLevel, Principal};
use atelier_db::queries::workspaces;
use axum::{
    extract::{Path, Request},
    middleware::Next,
    response::{IntoResponse, Response},
    RequestExt,
};

use crate::http::{ApiError, AppState};

pub async fn require_owner(state: Arc<AppState>, req: Request, next: Next) -> Response {
    guard(state, req, next, AccessLevel::Owner).await
}

pub async fn require_viewer(state: Arc<AppState>, req: Request, next: Next) -> Response {
    guard(state, req, next, AccessLevel::Viewer).await
}

async fn guard(
    state: Arc<AppState>,
    mut req: Request,
    next: Next,
    required: AccessLevel,
) -> Response {
    let params = match req.extract_parts::<Path<HashMap<String, String>>>().await {
        Ok(Path(params)) => params,
        Err(_) => return ApiError::bad_request("missing workspace id").into_response(),
    };
    let Some(workspace_id) = params.get("id").cloned() else {
        return ApiError::bad_request("missing workspace id").into_response();
    };
    let Some(principal) = req.extensions().get::<Principal>().cloned() else {
        return ApiError::unauthorized("authentication required").into_response();
    };

    let resolved = tokio::time::timeout(
        state.resolve_timeout,
        state.engine.resolver.resolve(&workspace_id, &principal.user_id),
    )
    .await;

    let level = match resolved {
        Err(_) => {
            tracing::error!(workspace_id = %workspace_id, "access resolution timed out");
            return ApiError::internal("access resolution timed out").into_response();
        }
        Ok(Err(err)) => return ApiError::from(err).into_response(),
        Ok(Ok(level)) => level,
    };

    match (required, level) {
        (AccessLevel::Owner, Some(AccessLevel::Viewer)) => {
            ApiError::forbidden("owner access required").into_response()
        }
        (_, Some(level)) => {
            req.extensions_mut().insert(level);
            next.run(req).await
        }
        (_, None) => missing_or_denied(&state, &workspace_id).await.into_response(),
    }
}

/// No effective access: 404 when the workspace does not exist, 403 when
/// it does but the caller has no share.
async fn missing_or_denied(state: &AppState, workspace_id: &str) -> ApiError {
    let conn = state.store.lock().await;
    match workspaces::owner_of(&conn, workspace_id) {
        Ok(Some(_)) => ApiError::forbidden("no access to this workspace"),
        Ok(None) => ApiError::not_found("workspace"),
        Err(err) => {
            tracing::error!(workspace_id = %workspace_id, error = %err, "workspace lookup failed");
            ApiError::internal("internal error")
        }
    }
}
