//! Principal extraction from bearer tokens.
//!
//! Sessions are issued elsewhere; this middleware only resolves a token
//! to its `(user_id, username)` principal and stashes it in request
//! extensions.

use std::sync::Arc;

use atelier_core::models::Principal;
use atelier_core::now_epoch;
use atelier_db::queries::sessions;
use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::{ApiError, AppState};

/// Pull the bearer token out of the Authorization header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve a bearer token against the sessions table.
pub async fn resolve_principal(
    state: &AppState,
    token: &str,
) -> Result<Option<Principal>, ApiError> {
    let conn = state.store.lock().await;
    let row = sessions::find_principal(&conn, token, now_epoch())?;
    Ok(row.map(|row| Principal {
        user_id: row.user_id,
        username: row.username,
    }))
}

/// Reject the request unless it carries a valid session token.
pub async fn require_principal(state: Arc<AppState>, mut req: Request, next: Next) -> Response {
    let Some(token) = bearer_token(req.headers()).map(str::to_owned) else {
        return ApiError::unauthorized("Missing bearer token").into_response();
    };

    match resolve_principal(&state, &token).await {
        Ok(Some(principal)) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Ok(None) => ApiError::unauthorized("Invalid or expired session").into_response(),
        Err(err) => err.into_response(),
    }
}
