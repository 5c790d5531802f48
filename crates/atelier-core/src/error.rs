//! Engine error taxonomy.
//!
//! Validation and not-found conditions are returned by the component
//! that detects them, never wrapped into a generic internal error.
//! Storage failures during access resolution are fail-closed: an error
//! is never indistinguishable from "access granted".

use atelier_db::DbError;

/// Errors produced by the share engine.
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    /// Malformed input or business-rule violation (self-share, past
    /// expiry, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The workspace already has an active share for this recipient.
    #[error("workspace is already shared with this user")]
    AlreadyShared,

    /// Authenticated, but neither owner nor shared-with.
    #[error("access denied")]
    AccessDenied,

    /// No principal on a request that requires one.
    #[error("authentication required")]
    Unauthenticated,

    /// The link is valid but gated behind login and the caller is
    /// anonymous. Not a hard failure: the UI redirects to login and
    /// retries with the same token.
    #[error("login required to use this link")]
    LoginRequired,

    /// Workspace, user, share, or token absent.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Storage failure.
    #[error("database error: {0}")]
    Db(#[from] DbError),

    /// Anything else unexpected.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ShareError>;
