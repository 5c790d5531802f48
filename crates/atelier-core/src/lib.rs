//! # atelier-core
//!
//! The access-control and share-lifecycle engine for Atelier
//! workspaces. Decides, for every request, whether a principal may view
//! a workspace; manages direct shares and link shares (creation, lazy
//! expiration, revocation); and records an append-only activity trail.
//!
//! The engine is request-scoped and stateless between calls: every
//! operation performs the minimum set of reads/writes against the
//! shared SQLite store and returns. Correctness leans on per-statement
//! atomicity plus the partial unique index on active shares, not on
//! in-process locking.

pub mod access;
pub mod activity;
pub mod error;
pub mod link;
pub mod models;
pub mod share;
pub mod token;

use std::sync::Arc;

pub use error::{Result, ShareError};

/// Shared handle to the SQLite store. One connection per process,
/// serialized behind an async mutex; callers must not hold it across
/// their own awaits.
pub type Store = Arc<tokio::sync::Mutex<rusqlite::Connection>>;

/// Wrap a connection into a [`Store`] handle.
pub fn store(conn: rusqlite::Connection) -> Store {
    Arc::new(tokio::sync::Mutex::new(conn))
}

/// Current Unix time in seconds.
pub fn now_epoch() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// All engine components, constructed once at process start and passed
/// by reference to every handler. There is no hidden global singleton.
pub struct Engine {
    pub resolver: access::AccessResolver,
    pub shares: share::ShareManager,
    pub links: link::LinkManager,
    pub activity: activity::ActivityRecorder,
}

impl Engine {
    pub fn new(store: Store) -> Self {
        let activity = activity::ActivityRecorder::new(store.clone());
        Self {
            resolver: access::AccessResolver::new(store.clone()),
            shares: share::ShareManager::new(store.clone(), activity.clone()),
            links: link::LinkManager::new(store, activity.clone()),
            activity,
        }
    }
}
