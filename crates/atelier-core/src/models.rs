//! API-facing domain types.
//!
//! Row structs live next to their queries in `atelier-db`; these are
//! the serialized shapes the HTTP surface returns.

use atelier_db::queries::{activity, links, shares};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The authenticated caller, as produced by the auth subsystem.
/// The engine trusts this value as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
}

/// Effective permission level for a `(workspace, user)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Owner,
    Viewer,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Owner => "owner",
            AccessLevel::Viewer => "viewer",
        }
    }
}

/// A direct user-to-user share.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    pub id: i64,
    pub workspace_id: String,
    pub owner_id: String,
    pub shared_with_user_id: String,
    pub permission_level: String,
    pub created_at: u64,
    pub expires_at: Option<u64>,
    pub last_accessed_at: Option<u64>,
    pub is_active: bool,
}

impl From<shares::ShareRow> for Share {
    fn from(row: shares::ShareRow) -> Self {
        Self {
            id: row.id,
            workspace_id: row.workspace_id,
            owner_id: row.owner_id,
            shared_with_user_id: row.shared_with_user_id,
            permission_level: row.permission_level,
            created_at: row.created_at,
            expires_at: row.expires_at,
            last_accessed_at: row.last_accessed_at,
            is_active: row.is_active,
        }
    }
}

/// A share joined with its recipient's username (owner listing).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareWithUser {
    #[serde(flatten)]
    pub share: Share,
    pub username: String,
}

impl From<shares::ShareWithUserRow> for ShareWithUser {
    fn from(row: shares::ShareWithUserRow) -> Self {
        Self {
            share: row.share.into(),
            username: row.username,
        }
    }
}

/// A workspace as listed in the recipient's shared-with-me view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedWorkspace {
    pub workspace_id: String,
    pub name: String,
    pub owner_id: String,
    pub owner_username: String,
    pub updated_at: u64,
    pub shared_at: u64,
    pub expires_at: Option<u64>,
    pub last_accessed_at: Option<u64>,
}

impl From<shares::SharedWorkspaceRow> for SharedWorkspace {
    fn from(row: shares::SharedWorkspaceRow) -> Self {
        Self {
            workspace_id: row.workspace_id,
            name: row.name,
            owner_id: row.owner_id,
            owner_username: row.owner_username,
            updated_at: row.updated_at,
            shared_at: row.shared_at,
            expires_at: row.expires_at,
            last_accessed_at: row.last_accessed_at,
        }
    }
}

/// A token-based share link.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub id: i64,
    pub workspace_id: String,
    pub token: String,
    pub requires_login: bool,
    pub created_at: u64,
    pub expires_at: Option<u64>,
    pub access_count: u64,
    pub is_active: bool,
    pub owner_username: String,
}

impl From<links::LinkRow> for ShareLink {
    fn from(row: links::LinkRow) -> Self {
        Self {
            id: row.id,
            workspace_id: row.workspace_id,
            token: row.token,
            requires_login: row.requires_login,
            created_at: row.created_at,
            expires_at: row.expires_at,
            access_count: row.access_count,
            is_active: row.is_active,
            owner_username: row.owner_username,
        }
    }
}

/// How a viewer reached a workspace.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareProvenance {
    #[serde(rename = "type")]
    pub share_type: &'static str,
    pub owner: String,
}

/// A workspace as served to a reader.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceView {
    pub id: String,
    pub name: String,
    pub content: Value,
    pub updated_at: u64,
    pub is_read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share: Option<ShareProvenance>,
}

impl WorkspaceView {
    /// Owner view: writable, no provenance.
    pub fn owned(ws: atelier_db::queries::workspaces::WorkspaceRow) -> Self {
        Self::build(ws, false, None)
    }

    /// Read-only view with share provenance.
    pub fn read_only(
        ws: atelier_db::queries::workspaces::WorkspaceRow,
        share: ShareProvenance,
    ) -> Self {
        Self::build(ws, true, Some(share))
    }

    fn build(
        ws: atelier_db::queries::workspaces::WorkspaceRow,
        is_read_only: bool,
        share: Option<ShareProvenance>,
    ) -> Self {
        // Content is opaque to the engine; a malformed blob degrades to
        // null rather than failing the view.
        let content = serde_json::from_str(&ws.content).unwrap_or(Value::Null);
        Self {
            id: ws.id,
            name: ws.name,
            content,
            updated_at: ws.updated_at,
            is_read_only,
            share,
        }
    }
}

/// An audit-trail entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: i64,
    pub workspace_id: String,
    pub user_id: Option<String>,
    pub share_type: String,
    pub action: String,
    pub created_at: u64,
}

impl From<activity::ActivityRow> for ActivityEntry {
    fn from(row: activity::ActivityRow) -> Self {
        Self {
            id: row.id,
            workspace_id: row.workspace_id,
            user_id: row.user_id,
            share_type: row.share_type,
            action: row.action,
            created_at: row.created_at,
        }
    }
}
