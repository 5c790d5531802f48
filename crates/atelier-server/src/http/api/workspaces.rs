use std::sync::Arc;

use atelier_core::activity::{ShareAction, ShareType};
use atelier_core::models::{AccessLevel, Principal, ShareProvenance, WorkspaceView};
use atelier_db::queries::{users, workspaces};
use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::http::{ApiError, AppState};

const DEFAULT_ACTIVITY_LIMIT: u32 = 50;
const MAX_ACTIVITY_LIMIT: u32 = 200;

/// GET /api/workspaces/{id}
///
/// The guard already resolved the caller's level. Owners get the
/// writable view; viewers get a read-only view with provenance, and the
/// visit lands in the activity trail.
pub async fn view_workspace(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Extension(level): Extension<AccessLevel>,
    Path(workspace_id): Path<String>,
) -> Result<Json<WorkspaceView>, ApiError> {
    let (workspace, owner_username) = {
        let conn = state.store.lock().await;
        let workspace =
            workspaces::get(&conn, &workspace_id)?.ok_or_else(|| ApiError::not_found("workspace"))?;
        let owner_username = users::find_active(&conn, &workspace.owner_id)?
            .map(|u| u.username)
            .unwrap_or_default();
        (workspace, owner_username)
    };

    let view = match level {
        AccessLevel::Owner => WorkspaceView::owned(workspace),
        AccessLevel::Viewer => {
            state
                .engine
                .activity
                .record(
                    &workspace_id,
                    Some(&principal.user_id),
                    ShareType::Direct,
                    ShareAction::Viewed,
                )
                .await;
            WorkspaceView::read_only(
                workspace,
                ShareProvenance {
                    share_type: "direct",
                    owner: owner_username,
                },
            )
        }
    };
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    limit: Option<u32>,
}

/// GET /api/workspaces/{id}/activity
pub async fn recent_activity(
    Extension(state): Extension<Arc<AppState>>,
    Path(workspace_id): Path<String>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .min(MAX_ACTIVITY_LIMIT);
    let entries = state.engine.activity.recent(&workspace_id, limit).await?;
    Ok(Json(json!({ "activity": entries })))
}
