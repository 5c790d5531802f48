//! Effective-permission resolution.
//!
//! Ownership is checked first and is always authoritative (it never
//! expires, so it is never cached). Share lookups apply lazy
//! expiration: an expired grant is deactivated as a side effect of the
//! read that discovers it. Storage errors propagate; the resolver never
//! grants access on error.

use atelier_db::queries::{shares, workspaces};

use crate::models::AccessLevel;
use crate::{now_epoch, Result, Store};

/// Resolves `(workspace, user)` to an effective permission level.
#[derive(Clone)]
pub struct AccessResolver {
    store: Store,
}

impl AccessResolver {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Determine the caller's effective access to a workspace.
    ///
    /// Returns `None` for no access, unknown workspaces, and expired
    /// grants. May write (lazy expiration, last-accessed telemetry)
    /// even on read-only requests; both writes are best-effort and a
    /// failure never changes the resolution result.
    pub async fn resolve(&self, workspace_id: &str, user_id: &str) -> Result<Option<AccessLevel>> {
        let now = now_epoch();
        let conn = self.store.lock().await;

        match workspaces::owner_of(&conn, workspace_id)? {
            Some(owner) if owner == user_id => return Ok(Some(AccessLevel::Owner)),
            Some(_) => {}
            // Unknown or soft-deleted workspace: nothing to resolve.
            None => return Ok(None),
        }

        let Some(share) = shares::find_active(&conn, workspace_id, user_id)? else {
            return Ok(None);
        };

        if share.expires_at.is_some_and(|t| t < now) {
            // Lazy expiration. The decision is already made; the
            // deactivation only accelerates cleanup, so a failure (or a
            // concurrent revoke having flipped the flag first) is fine.
            if let Err(err) = shares::deactivate(&conn, share.id) {
                tracing::warn!(share_id = share.id, error = %err, "lazy expiration write failed");
            }
            return Ok(None);
        }

        if let Err(err) = shares::touch_last_accessed(&conn, share.id, now) {
            tracing::warn!(share_id = share.id, error = %err, "last-accessed update failed");
        }

        Ok(Some(AccessLevel::Viewer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_db::queries::users;

    async fn test_store() -> Store {
        let conn = atelier_db::open_memory().expect("open test db");
        users::insert(&conn, "u1", "alice", 1000).expect("user");
        users::insert(&conn, "u2", "bob", 1000).expect("user");
        workspaces::insert(&conn, "w1", "u1", "Plans", "{}", 1000).expect("ws");
        crate::store(conn)
    }

    #[tokio::test]
    async fn test_owner_resolves_as_owner() {
        let store = test_store().await;
        let resolver = AccessResolver::new(store);

        let level = resolver.resolve("w1", "u1").await.expect("resolve");
        assert_eq!(level, Some(AccessLevel::Owner));
    }

    #[tokio::test]
    async fn test_unshared_user_resolves_none() {
        let store = test_store().await;
        let resolver = AccessResolver::new(store);

        assert_eq!(resolver.resolve("w1", "u2").await.expect("resolve"), None);
        assert_eq!(resolver.resolve("missing", "u2").await.expect("resolve"), None);
    }

    #[tokio::test]
    async fn test_active_share_resolves_viewer_and_touches() {
        let store = test_store().await;
        let share_id = {
            let conn = store.lock().await;
            shares::insert(&conn, "w1", "u1", "u2", None, 2000).expect("share")
        };
        let resolver = AccessResolver::new(store.clone());

        let level = resolver.resolve("w1", "u2").await.expect("resolve");
        assert_eq!(level, Some(AccessLevel::Viewer));

        let conn = store.lock().await;
        let row = shares::get(&conn, share_id).expect("get").expect("row");
        assert!(row.last_accessed_at.is_some(), "viewer access updates telemetry");
    }

    #[tokio::test]
    async fn test_expired_share_lazily_deactivated() {
        let store = test_store().await;
        let share_id = {
            let conn = store.lock().await;
            // expires_at well in the past
            shares::insert(&conn, "w1", "u1", "u2", Some(1), 0).expect("share")
        };
        let resolver = AccessResolver::new(store.clone());

        assert_eq!(resolver.resolve("w1", "u2").await.expect("resolve"), None);

        // Second resolve observes the flipped flag.
        let conn = store.lock().await;
        let row = shares::get(&conn, share_id).expect("get").expect("row");
        assert!(!row.is_active, "lazy expiration deactivates the row");
    }

    #[tokio::test]
    async fn test_owner_check_beats_expired_share() {
        // An owner with a stray share row still resolves as owner.
        let store = test_store().await;
        let resolver = AccessResolver::new(store.clone());

        let level = resolver.resolve("w1", "u1").await.expect("resolve");
        assert_eq!(level, Some(AccessLevel::Owner));
    }
}
