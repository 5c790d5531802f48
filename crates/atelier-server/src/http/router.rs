use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::Next,
    routing::{delete, get, post},
    Extension, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{api, middleware, AppState};

pub fn build_router(state: Arc<AppState>) -> Router {
    let auth_guard = {
        let state = state.clone();
        axum::middleware::from_fn(move |req: Request, next: Next| {
            let state = state.clone();
            async move { middleware::auth::require_principal(state, req, next).await }
        })
    };
    let owner_guard = {
        let state = state.clone();
        axum::middleware::from_fn(move |req: Request, next: Next| {
            let state = state.clone();
            async move { middleware::access::require_owner(state, req, next).await }
        })
    };
    let viewer_guard = {
        let state = state.clone();
        axum::middleware::from_fn(move |req: Request, next: Next| {
            let state = state.clone();
            async move { middleware::access::require_viewer(state, req, next).await }
        })
    };

    // Owner-only share management. The auth guard runs first (outermost)
    // so the access guard always sees a principal.
    let owner_routes = Router::new()
        .route(
            "/workspaces/{id}/shares",
            post(api::shares::create_share).get(api::shares::list_shares),
        )
        .route(
            "/workspaces/{id}/shares/{user_id}",
            delete(api::shares::revoke_share),
        )
        .route(
            "/workspaces/{id}/shares/by-id/{share_id}",
            delete(api::shares::revoke_share_by_id),
        )
        .route(
            "/workspaces/{id}/share-link",
            post(api::links::create_link).get(api::links::list_links),
        )
        .route(
            "/workspaces/{id}/share-link/{link_id}",
            delete(api::links::revoke_link),
        )
        .route(
            "/workspaces/{id}/activity",
            get(api::workspaces::recent_activity),
        )
        .route_layer(owner_guard)
        .route_layer(auth_guard.clone());

    let viewer_routes = Router::new()
        .route("/workspaces/{id}", get(api::workspaces::view_workspace))
        .route_layer(viewer_guard)
        .route_layer(auth_guard.clone());

    let user_routes = Router::new()
        .route("/users/search", get(api::users::search_users))
        .route("/shared-with-me", get(api::shares::shared_with_me))
        .route_layer(auth_guard);

    // Link viewing is the one route open to anonymous callers; the
    // handler does its own optional principal resolution.
    let public_routes = Router::new().route("/shared/{token}", get(api::shared::view_shared));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .nest(
            "/api",
            owner_routes
                .merge(viewer_routes)
                .merge(user_routes)
                .merge(public_routes),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(state))
}

async fn health_check() -> &'static str {
    "OK"
}
