//! Link-share lifecycle: token issuance, validation, access tracking,
//! revocation.

use atelier_db::queries::{links, workspaces};

use crate::activity::{ActivityRecorder, ShareAction, ShareType};
use crate::models::{Principal, ShareLink, ShareProvenance, WorkspaceView};
use crate::{now_epoch, token, Result, ShareError, Store};

/// Options for creating a share link.
#[derive(Debug, Clone)]
pub struct CreateLinkOptions {
    /// Whether viewers must be logged in. Defaults to true.
    pub requires_login: bool,
    /// Hours until expiry. `None` means the link never expires.
    pub expires_in_hours: Option<u64>,
}

impl Default for CreateLinkOptions {
    fn default() -> Self {
        Self {
            requires_login: true,
            expires_in_hours: None,
        }
    }
}

/// Creates, validates, and tracks usage of link-based shares.
#[derive(Clone)]
pub struct LinkManager {
    store: Store,
    recorder: ActivityRecorder,
}

impl LinkManager {
    pub fn new(store: Store, recorder: ActivityRecorder) -> Self {
        Self { store, recorder }
    }

    /// Issue a new share link for a workspace the caller owns.
    pub async fn create_link(
        &self,
        workspace_id: &str,
        owner_id: &str,
        opts: CreateLinkOptions,
    ) -> Result<ShareLink> {
        let now = now_epoch();
        let expires_at = match opts.expires_in_hours {
            Some(0) => {
                return Err(ShareError::Validation(
                    "link expiry must be at least one hour".into(),
                ));
            }
            Some(hours) => Some(
                hours
                    .checked_mul(3600)
                    .and_then(|secs| now.checked_add(secs))
                    .ok_or_else(|| {
                        ShareError::Validation("link expiry is too far in the future".into())
                    })?,
            ),
            None => None,
        };

        let link_id = {
            let conn = self.store.lock().await;
            let owner = workspaces::owner_of(&conn, workspace_id)?
                .ok_or(ShareError::NotFound("workspace"))?;
            if owner != owner_id {
                return Err(ShareError::AccessDenied);
            }

            // Collisions are probabilistically impossible at 256 bits of
            // entropy; the existence check is defense in depth.
            let mut issued = None;
            for _ in 0..4 {
                let candidate = token::generate();
                if !links::token_exists(&conn, &candidate)? {
                    issued = Some(candidate);
                    break;
                }
            }
            let tok = issued
                .ok_or_else(|| ShareError::Internal("token generation kept colliding".into()))?;

            links::insert(
                &conn,
                workspace_id,
                owner_id,
                &tok,
                opts.requires_login,
                expires_at,
                now,
            )?
        };

        self.recorder
            .record(workspace_id, Some(owner_id), ShareType::Link, ShareAction::LinkCreated)
            .await;

        let conn = self.store.lock().await;
        links::get(&conn, link_id)?
            .map(Into::into)
            .ok_or_else(|| ShareError::Internal("created link vanished".into()))
    }

    /// Look up an active, unexpired link by token.
    ///
    /// An expired link is deactivated as a side effect of the lookup
    /// and reported as absent.
    pub async fn validate_link(&self, token: &str) -> Result<Option<ShareLink>> {
        let conn = self.store.lock().await;
        Ok(validate_inner(&conn, token, now_epoch())?.map(Into::into))
    }

    /// Serve a workspace through a link token.
    ///
    /// Anonymous callers are rejected with [`ShareError::LoginRequired`]
    /// when the link is login-gated — a retryable condition, not a hard
    /// failure. The activity record and access-count increment are
    /// telemetry: the view has already been determined, so neither may
    /// fail the request.
    pub async fn access_via_link(
        &self,
        token: &str,
        principal: Option<&Principal>,
    ) -> Result<WorkspaceView> {
        let (link, workspace) = {
            let conn = self.store.lock().await;
            let link = validate_inner(&conn, token, now_epoch())?
                .ok_or(ShareError::NotFound("link"))?;
            if link.requires_login && principal.is_none() {
                return Err(ShareError::LoginRequired);
            }
            let workspace = workspaces::get(&conn, &link.workspace_id)?
                .ok_or(ShareError::NotFound("workspace"))?;
            (link, workspace)
        };

        self.recorder
            .record(
                &link.workspace_id,
                principal.map(|p| p.user_id.as_str()),
                ShareType::Link,
                ShareAction::Viewed,
            )
            .await;

        {
            let conn = self.store.lock().await;
            if let Err(err) = links::increment_access_count(&conn, link.id) {
                tracing::warn!(link_id = link.id, error = %err, "access count update failed");
            }
        }

        Ok(WorkspaceView::read_only(
            workspace,
            ShareProvenance {
                share_type: "link",
                owner: link.owner_username,
            },
        ))
    }

    /// Revoke a link. Returns `false` when no matching active link
    /// exists; idempotent-safe like share revocation.
    pub async fn revoke_link(
        &self,
        workspace_id: &str,
        owner_id: &str,
        link_id: i64,
    ) -> Result<bool> {
        let revoked = {
            let conn = self.store.lock().await;
            let owner = workspaces::owner_of(&conn, workspace_id)?
                .ok_or(ShareError::NotFound("workspace"))?;
            if owner != owner_id {
                return Err(ShareError::AccessDenied);
            }
            links::deactivate_for_owner(&conn, workspace_id, owner_id, link_id)? > 0
        };

        if revoked {
            self.recorder
                .record(workspace_id, Some(owner_id), ShareType::Link, ShareAction::LinkRevoked)
                .await;
        }
        Ok(revoked)
    }

    /// Active links for a workspace, newest first. Owner-only.
    pub async fn list_links(&self, workspace_id: &str, owner_id: &str) -> Result<Vec<ShareLink>> {
        let conn = self.store.lock().await;
        let owner = workspaces::owner_of(&conn, workspace_id)?
            .ok_or(ShareError::NotFound("workspace"))?;
        if owner != owner_id {
            return Err(ShareError::AccessDenied);
        }
        let rows = links::list_for_workspace(&conn, workspace_id)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Shared lookup-with-lazy-expiration used by validation and access.
fn validate_inner(
    conn: &rusqlite::Connection,
    token: &str,
    now: u64,
) -> Result<Option<links::LinkRow>> {
    let Some(link) = links::find_active_by_token(conn, token)? else {
        return Ok(None);
    };
    if link.expires_at.is_some_and(|t| t < now) {
        if let Err(err) = links::deactivate(conn, link.id) {
            tracing::warn!(link_id = link.id, error = %err, "lazy link expiration failed");
        }
        return Ok(None);
    }
    Ok(Some(link))
}
