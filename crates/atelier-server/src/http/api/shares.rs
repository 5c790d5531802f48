use std::sync::Arc;

use atelier_core::models::{Principal, Share};
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::http::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareRequest {
    share_with_user_id: String,
    expires_at: Option<u64>,
}

/// POST /api/workspaces/{id}/shares
pub async fn create_share(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(workspace_id): Path<String>,
    Json(req): Json<CreateShareRequest>,
) -> Result<(StatusCode, Json<Share>), ApiError> {
    let share = state
        .engine
        .shares
        .create_share(
            &workspace_id,
            &principal.user_id,
            &req.share_with_user_id,
            req.expires_at,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(share)))
}

/// GET /api/workspaces/{id}/shares
pub async fn list_shares(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(workspace_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let shares = state
        .engine
        .shares
        .list_shares(&workspace_id, &principal.user_id)
        .await?;
    Ok(Json(json!({ "shares": shares })))
}

/// DELETE /api/workspaces/{id}/shares/{user_id}
pub async fn revoke_share(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path((workspace_id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let revoked = state
        .engine
        .shares
        .revoke_by_recipient(&workspace_id, &principal.user_id, &user_id)
        .await?;
    if revoked {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("share"))
    }
}

/// DELETE /api/workspaces/{id}/shares/by-id/{share_id}
pub async fn revoke_share_by_id(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path((workspace_id, share_id)): Path<(String, i64)>,
) -> Result<StatusCode, ApiError> {
    let revoked = state
        .engine
        .shares
        .revoke_by_share_id(&workspace_id, &principal.user_id, share_id)
        .await?;
    if revoked {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("share"))
    }
}

/// GET /api/shared-with-me
pub async fn shared_with_me(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let workspaces = state.engine.shares.shared_with_me(&principal.user_id).await?;
    Ok(Json(json!({ "workspaces": workspaces })))
}
