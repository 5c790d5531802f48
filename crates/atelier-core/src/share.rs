//! Direct-share lifecycle: grants, revocation, owner and recipient
//! listings.

use atelier_db::queries::{shares, users, workspaces};

use crate::activity::{ActivityRecorder, ShareAction, ShareType};
use crate::models::{Share, ShareWithUser, SharedWorkspace};
use crate::{now_epoch, Result, ShareError, Store};

/// Creates and revokes direct user-to-user shares.
#[derive(Clone)]
pub struct ShareManager {
    store: Store,
    recorder: ActivityRecorder,
}

impl ShareManager {
    pub fn new(store: Store, recorder: ActivityRecorder) -> Self {
        Self { store, recorder }
    }

    /// Grant view access to a user.
    ///
    /// The caller-claimed owner is re-verified against the store, not
    /// trusted from request context. Each precondition failure maps to
    /// a distinct error. The check-then-insert window is closed by the
    /// partial unique index: a concurrent duplicate grant surfaces as a
    /// constraint conflict and is reported as [`ShareError::AlreadyShared`].
    pub async fn create_share(
        &self,
        workspace_id: &str,
        owner_id: &str,
        target_user_id: &str,
        expires_at: Option<u64>,
    ) -> Result<Share> {
        let now = now_epoch();
        let share = {
            let conn = self.store.lock().await;

            let owner = workspaces::owner_of(&conn, workspace_id)?
                .ok_or(ShareError::NotFound("workspace"))?;
            if owner != owner_id {
                return Err(ShareError::AccessDenied);
            }
            if target_user_id == owner_id {
                return Err(ShareError::Validation(
                    "a workspace cannot be shared with its owner".into(),
                ));
            }
            if users::find_active(&conn, target_user_id)?.is_none() {
                return Err(ShareError::NotFound("user"));
            }
            if let Some(t) = expires_at {
                if t <= now {
                    return Err(ShareError::Validation(
                        "expiry must be in the future".into(),
                    ));
                }
            }
            if shares::find_active(&conn, workspace_id, target_user_id)?.is_some() {
                return Err(ShareError::AlreadyShared);
            }

            let id = match shares::insert(
                &conn,
                workspace_id,
                owner_id,
                target_user_id,
                expires_at,
                now,
            ) {
                Ok(id) => id,
                Err(err) if err.is_constraint_violation() => {
                    // Lost the duplicate-grant race to a concurrent insert.
                    return Err(ShareError::AlreadyShared);
                }
                Err(err) => return Err(err.into()),
            };

            Share {
                id,
                workspace_id: workspace_id.to_string(),
                owner_id: owner_id.to_string(),
                shared_with_user_id: target_user_id.to_string(),
                permission_level: "view".to_string(),
                created_at: now,
                expires_at,
                last_accessed_at: None,
                is_active: true,
            }
        };

        self.recorder
            .record(
                workspace_id,
                Some(target_user_id),
                ShareType::Direct,
                ShareAction::Granted,
            )
            .await;

        Ok(share)
    }

    /// Revoke the active share held by a recipient.
    ///
    /// Returns `false` (not an error) when no matching active share
    /// exists, so callers can revoke idempotently while still telling
    /// "revoked" from "nothing to revoke".
    pub async fn revoke_by_recipient(
        &self,
        workspace_id: &str,
        owner_id: &str,
        target_user_id: &str,
    ) -> Result<bool> {
        let revoked = {
            let conn = self.store.lock().await;
            self.check_owner(&conn, workspace_id, owner_id)?;
            shares::deactivate_by_recipient(&conn, workspace_id, owner_id, target_user_id)?
                .is_some()
        };

        if revoked {
            self.recorder
                .record(
                    workspace_id,
                    Some(target_user_id),
                    ShareType::Direct,
                    ShareAction::Revoked,
                )
                .await;
        }
        Ok(revoked)
    }

    /// Revoke a share by its row id.
    pub async fn revoke_by_share_id(
        &self,
        workspace_id: &str,
        owner_id: &str,
        share_id: i64,
    ) -> Result<bool> {
        let recipient = {
            let conn = self.store.lock().await;
            self.check_owner(&conn, workspace_id, owner_id)?;

            let recipient = shares::get(&conn, share_id)?
                .filter(|s| s.workspace_id == workspace_id)
                .map(|s| s.shared_with_user_id);
            match shares::deactivate_by_id(&conn, workspace_id, owner_id, share_id)? {
                0 => None,
                _ => recipient,
            }
        };

        match recipient {
            Some(user) => {
                self.recorder
                    .record(
                        workspace_id,
                        Some(&user),
                        ShareType::Direct,
                        ShareAction::Revoked,
                    )
                    .await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Active shares for a workspace with recipient usernames, newest
    /// first. Owner-only.
    pub async fn list_shares(
        &self,
        workspace_id: &str,
        owner_id: &str,
    ) -> Result<Vec<ShareWithUser>> {
        let conn = self.store.lock().await;
        self.check_owner(&conn, workspace_id, owner_id)?;
        let rows = shares::list_for_workspace(&conn, workspace_id)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Workspaces actively shared with the caller, most recently used
    /// first.
    pub async fn shared_with_me(&self, user_id: &str) -> Result<Vec<SharedWorkspace>> {
        let conn = self.store.lock().await;
        let rows = shares::list_shared_with(&conn, user_id, now_epoch())?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn check_owner(
        &self,
        conn: &rusqlite::Connection,
        workspace_id: &str,
        owner_id: &str,
    ) -> Result<()> {
        let owner =
            workspaces::owner_of(conn, workspace_id)?.ok_or(ShareError::NotFound("workspace"))?;
        if owner != owner_id {
            return Err(ShareError::AccessDenied);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fixture() -> (ShareManager, Store) {
        let conn = atelier_db::open_memory().expect("open test db");
        users::insert(&conn, "u1", "alice", 1000).expect("user");
        users::insert(&conn, "u2", "bob", 1000).expect("user");
        users::insert(&conn, "u3", "carol", 1000).expect("user");
        workspaces::insert(&conn, "w1", "u1", "Plans", "{}", 1000).expect("ws");
        let store = crate::store(conn);
        let recorder = ActivityRecorder::new(store.clone());
        (ShareManager::new(store.clone(), recorder), store)
    }

    #[tokio::test]
    async fn test_create_share_happy_path() {
        let (mgr, store) = fixture().await;

        let share = mgr.create_share("w1", "u1", "u2", None).await.expect("create");
        assert_eq!(share.permission_level, "view");
        assert!(share.is_active);

        // A share_granted activity record was appended.
        let conn = store.lock().await;
        let acts = atelier_db::queries::activity::recent(&conn, "w1", 10).expect("activity");
        assert_eq!(acts.len(), 1);
        assert_eq!(acts[0].action, "share_granted");
        assert_eq!(acts[0].user_id.as_deref(), Some("u2"));
    }

    #[tokio::test]
    async fn test_self_share_rejected() {
        let (mgr, _) = fixture().await;

        let err = mgr
            .create_share("w1", "u1", "u1", Some(now_epoch() + 3600))
            .await
            .expect_err("self-share must fail");
        assert!(matches!(err, ShareError::Validation(_)));
    }

    #[tokio::test]
    async fn test_non_owner_cannot_share() {
        let (mgr, _) = fixture().await;

        let err = mgr
            .create_share("w1", "u2", "u3", None)
            .await
            .expect_err("non-owner must fail");
        assert!(matches!(err, ShareError::AccessDenied));
    }

    #[tokio::test]
    async fn test_unknown_recipient_rejected() {
        let (mgr, _) = fixture().await;

        let err = mgr
            .create_share("w1", "u1", "nobody", None)
            .await
            .expect_err("unknown user must fail");
        assert!(matches!(err, ShareError::NotFound("user")));
    }

    #[tokio::test]
    async fn test_past_expiry_rejected() {
        let (mgr, _) = fixture().await;

        let err = mgr
            .create_share("w1", "u1", "u2", Some(1))
            .await
            .expect_err("past expiry must fail");
        assert!(matches!(err, ShareError::Validation(_)));
    }

    #[tokio::test]
    async fn test_duplicate_share_conflict() {
        let (mgr, _) = fixture().await;

        mgr.create_share("w1", "u1", "u2", None).await.expect("first");
        let err = mgr
            .create_share("w1", "u1", "u2", None)
            .await
            .expect_err("duplicate must fail");
        assert!(matches!(err, ShareError::AlreadyShared));
    }

    #[tokio::test]
    async fn test_revoke_idempotent() {
        let (mgr, _) = fixture().await;
        mgr.create_share("w1", "u1", "u2", None).await.expect("create");

        assert!(mgr.revoke_by_recipient("w1", "u1", "u2").await.expect("first"));
        assert!(!mgr.revoke_by_recipient("w1", "u1", "u2").await.expect("second"));
    }

    #[tokio::test]
    async fn test_revoke_by_share_id() {
        let (mgr, store) = fixture().await;
        let share = mgr.create_share("w1", "u1", "u2", None).await.expect("create");

        assert!(mgr
            .revoke_by_share_id("w1", "u1", share.id)
            .await
            .expect("revoke"));
        assert!(!mgr
            .revoke_by_share_id("w1", "u1", share.id)
            .await
            .expect("again"));

        let conn = store.lock().await;
        let acts = atelier_db::queries::activity::recent(&conn, "w1", 10).expect("activity");
        assert_eq!(acts[0].action, "share_revoked");
        assert_eq!(acts[0].user_id.as_deref(), Some("u2"));
    }

    #[tokio::test]
    async fn test_revoke_requires_ownership() {
        let (mgr, _) = fixture().await;
        mgr.create_share("w1", "u1", "u2", None).await.expect("create");

        let err = mgr
            .revoke_by_recipient("w1", "u3", "u2")
            .await
            .expect_err("non-owner revoke must fail");
        assert!(matches!(err, ShareError::AccessDenied));
    }

    #[tokio::test]
    async fn test_list_shares_owner_only() {
        let (mgr, _) = fixture().await;
        mgr.create_share("w1", "u1", "u2", None).await.expect("create");

        let shares = mgr.list_shares("w1", "u1").await.expect("list");
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].username, "bob");

        let err = mgr.list_shares("w1", "u2").await.expect_err("viewer cannot list");
        assert!(matches!(err, ShareError::AccessDenied));
    }

    #[tokio::test]
    async fn test_shared_with_me() {
        let (mgr, _) = fixture().await;
        mgr.create_share("w1", "u1", "u2", None).await.expect("create");

        let list = mgr.shared_with_me("u2").await.expect("list");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].workspace_id, "w1");
        assert_eq!(list[0].owner_username, "alice");

        assert!(mgr.shared_with_me("u3").await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_activity_failure_does_not_fail_grant() {
        let (mgr, store) = fixture().await;
        {
            let conn = store.lock().await;
            conn.execute("DROP TABLE share_activity", []).expect("drop");
        }

        // The grant itself must still succeed.
        let share = mgr.create_share("w1", "u1", "u2", None).await.expect("create");
        assert!(share.is_active);
    }
}
