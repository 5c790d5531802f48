use std::sync::Arc;

use atelier_core::models::Principal;
use atelier_db::queries::users;
use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::http::{ApiError, AppState};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 20;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserHit {
    id: String,
    username: String,
}

/// Username substring search for the share dialog. The caller is never
/// included in the results.
pub async fn search_users(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pattern = query.q.trim();
    if pattern.chars().count() < 2 {
        return Err(ApiError::bad_request("query must be at least 2 characters"));
    }
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    let conn = state.store.lock().await;
    let hits = users::search(&conn, pattern, &principal.user_id, limit)?
        .into_iter()
        .map(|row| UserHit {
            id: row.id,
            username: row.username,
        })
        .collect::<Vec<_>>();
    Ok(Json(json!({ "users": hits })))
}
