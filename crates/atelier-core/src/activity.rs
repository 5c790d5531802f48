//! Best-effort activity recording.
//!
//! Audit logging is valuable but must never turn a successful share,
//! revoke, or view into a user-visible failure. Every write here is
//! wrapped in an error boundary: failures are logged and swallowed.

use atelier_db::queries::activity;

use crate::models::ActivityEntry;
use crate::{now_epoch, Result, Store};

/// What kind of grant an activity entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareType {
    Direct,
    Link,
}

impl ShareType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareType::Direct => "direct_share",
            ShareType::Link => "link_share",
        }
    }
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareAction {
    Granted,
    Revoked,
    LinkCreated,
    LinkRevoked,
    Viewed,
}

impl ShareAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareAction::Granted => "share_granted",
            ShareAction::Revoked => "share_revoked",
            ShareAction::LinkCreated => "link_created",
            ShareAction::LinkRevoked => "link_revoked",
            ShareAction::Viewed => "viewed",
        }
    }
}

/// Appends audit events for share-related actions.
#[derive(Clone)]
pub struct ActivityRecorder {
    store: Store,
}

impl ActivityRecorder {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Append an activity record. Never fails the caller.
    ///
    /// `user_id` is `None` for anonymous link viewers.
    pub async fn record(
        &self,
        workspace_id: &str,
        user_id: Option<&str>,
        share_type: ShareType,
        action: ShareAction,
    ) {
        let conn = self.store.lock().await;
        if let Err(err) = activity::insert(
            &conn,
            workspace_id,
            user_id,
            share_type.as_str(),
            action.as_str(),
            now_epoch(),
        ) {
            tracing::warn!(
                workspace_id,
                action = action.as_str(),
                error = %err,
                "failed to record share activity"
            );
        }
    }

    /// Most recent activity for a workspace, newest first. Owner-only;
    /// the authorization layer gates the call.
    pub async fn recent(&self, workspace_id: &str, limit: u32) -> Result<Vec<ActivityEntry>> {
        let conn = self.store.lock().await;
        let rows = activity::recent(&conn, workspace_id, limit)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
