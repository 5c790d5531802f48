use std::sync::Arc;

use atelier_core::link::CreateLinkOptions;
use atelier_core::models::Principal;
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    requires_login: Option<bool>,
    /// Hours until expiry; omitted means the link never expires.
    /// Deserialized signed so that a negative value reaches the
    /// validation below instead of failing body extraction.
    expires_in: Option<i64>,
}

/// POST /api/workspaces/{id}/share-link
///
/// The response carries the full shareable URL alongside the link
/// fields, so clients never assemble it themselves.
pub async fn create_link(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(workspace_id): Path<String>,
    Json(req): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let expires_in_hours = match req.expires_in {
        Some(hours) if hours < 0 => {
            return Err(ApiError::bad_request(
                "expiresIn must be a positive number of hours",
            ));
        }
        Some(hours) => Some(hours as u64),
        None => None,
    };
    let opts = CreateLinkOptions {
        requires_login: req.requires_login.unwrap_or(true),
        expires_in_hours,
    };
    let link = state
        .engine
        .links
        .create_link(&workspace_id, &principal.user_id, opts)
        .await?;

    let url = format!("{}/shared/{}", state.public_base_url, link.token);
    let mut body = serde_json::to_value(&link)
        .map_err(|err| ApiError::internal(err.to_string()))?;
    if let Value::Object(map) = &mut body {
        map.insert("link".to_string(), Value::String(url));
    }
    Ok((StatusCode::CREATED, Json(body)))
}

/// GET /api/workspaces/{id}/share-link
pub async fn list_links(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(workspace_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let links = state
        .engine
        .links
        .list_links(&workspace_id, &principal.user_id)
        .await?;
    Ok(Json(json!({ "links": links })))
}

/// DELETE /api/workspaces/{id}/share-link/{link_id}
pub async fn revoke_link(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path((workspace_id, link_id)): Path<(String, i64)>,
) -> Result<StatusCode, ApiError> {
    let revoked = state
        .engine
        .links
        .revoke_link(&workspace_id, &principal.user_id, link_id)
        .await?;
    if revoked {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("link"))
    }
}
