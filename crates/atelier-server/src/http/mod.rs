//! HTTP surface: router, middleware, and handlers.

pub mod api;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use server::HttpServer;

use std::time::Duration;

use atelier_core::{Engine, Store};

/// Process-wide state handed to every request via `Extension`.
pub struct AppState {
    pub engine: Engine,
    pub store: Store,
    /// Base URL prepended to share-link tokens, no trailing slash.
    pub public_base_url: String,
    /// Deadline for access resolution in the authorization middleware.
    pub resolve_timeout: Duration,
}
