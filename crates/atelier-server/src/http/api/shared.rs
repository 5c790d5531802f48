use std::sync::Arc;

use atelier_core::models::WorkspaceView;
use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
    Json,
};

use crate::http::middleware::auth;
use crate::http::{ApiError, AppState};

/// GET /api/shared/{token}
///
/// The only unauthenticated route. A bearer token is honored when
/// present so login-gated links work in one request; a present-but-bad
/// token is rejected rather than downgraded to anonymous.
pub async fn view_shared(
    Extension(state): Extension<Arc<AppState>>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Result<Json<WorkspaceView>, ApiError> {
    let principal = match auth::bearer_token(&headers) {
        Some(session_token) => match auth::resolve_principal(&state, session_token).await? {
            Some(principal) => Some(principal),
            None => return Err(ApiError::unauthorized("Invalid or expired session")),
        },
        None => None,
    };

    let view = state
        .engine
        .links
        .access_via_link(&token, principal.as_ref())
        .await?;
    Ok(Json(view))
}
