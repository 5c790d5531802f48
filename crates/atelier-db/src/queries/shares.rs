//! Direct-share query functions.
//!
//! Share rows are never physically deleted; revocation and lazy
//! expiration flip `is_active` and the row persists as history.

use rusqlite::Connection;

use crate::Result;

/// Insert a new active share and return its row id.
///
/// The partial unique index on `(workspace_id, shared_with_user_id)
/// WHERE is_active = 1` makes a concurrent duplicate grant surface as a
/// constraint violation; callers translate that, they do not treat it
/// as an internal error.
pub fn insert(
    conn: &Connection,
    workspace_id: &str,
    owner_id: &str,
    shared_with_user_id: &str,
    expires_at: Option<u64>,
    created_at: u64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO workspace_shares
         (workspace_id, owner_id, shared_with_user_id, permission_level, created_at, expires_at)
         VALUES (?1, ?2, ?3, 'view', ?4, ?5)",
        rusqlite::params![
            workspace_id,
            owner_id,
            shared_with_user_id,
            created_at as i64,
            expires_at.map(|t| t as i64),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Find the single active share for a `(workspace, recipient)` pair.
pub fn find_active(
    conn: &Connection,
    workspace_id: &str,
    shared_with_user_id: &str,
) -> Result<Option<ShareRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLS} FROM workspace_shares
         WHERE workspace_id = ?1 AND shared_with_user_id = ?2 AND is_active = 1"
    ))?;
    let mut rows = stmt.query_map([workspace_id, shared_with_user_id], map_share_row)?;
    rows.next().transpose().map_err(Into::into)
}

/// Fetch a share by row id regardless of active state.
pub fn get(conn: &Connection, id: i64) -> Result<Option<ShareRow>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {COLS} FROM workspace_shares WHERE id = ?1"))?;
    let mut rows = stmt.query_map([id], map_share_row)?;
    rows.next().transpose().map_err(Into::into)
}

/// Deactivate a share. Returns the number of rows changed.
///
/// Zero rows is not an error: a concurrent revoke or lazy expiration
/// may have already flipped the flag, and setting it again is harmless.
pub fn deactivate(conn: &Connection, id: i64) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE workspace_shares SET is_active = 0 WHERE id = ?1 AND is_active = 1",
        [id],
    )?;
    Ok(changed)
}

/// Deactivate the active share for a recipient, scoped to the owner's
/// workspace. Returns the deactivated share id, if any.
pub fn deactivate_by_recipient(
    conn: &Connection,
    workspace_id: &str,
    owner_id: &str,
    shared_with_user_id: &str,
) -> Result<Option<i64>> {
    let mut stmt = conn.prepare(
        "UPDATE workspace_shares SET is_active = 0
         WHERE workspace_id = ?1 AND owner_id = ?2
           AND shared_with_user_id = ?3 AND is_active = 1
         RETURNING id",
    )?;
    let mut rows = stmt.query_map(
        [workspace_id, owner_id, shared_with_user_id],
        |row| row.get::<_, i64>(0),
    )?;
    rows.next().transpose().map_err(Into::into)
}

/// Deactivate a share by row id, scoped to the owner's workspace.
/// Returns the number of rows changed.
pub fn deactivate_by_id(
    conn: &Connection,
    workspace_id: &str,
    owner_id: &str,
    id: i64,
) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE workspace_shares SET is_active = 0
         WHERE id = ?1 AND workspace_id = ?2 AND owner_id = ?3 AND is_active = 1",
        rusqlite::params![id, workspace_id, owner_id],
    )?;
    Ok(changed)
}

/// Record that a recipient resolved access through this share.
pub fn touch_last_accessed(conn: &Connection, id: i64, now: u64) -> Result<()> {
    conn.execute(
        "UPDATE workspace_shares SET last_accessed_at = ?1 WHERE id = ?2",
        rusqlite::params![now as i64, id],
    )?;
    Ok(())
}

/// List active shares for a workspace with recipient usernames,
/// newest grant first.
pub fn list_for_workspace(conn: &Connection, workspace_id: &str) -> Result<Vec<ShareWithUserRow>> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.workspace_id, s.owner_id, s.shared_with_user_id,
                s.permission_level, s.created_at, s.expires_at,
                s.last_accessed_at, s.is_active, u.username
         FROM workspace_shares s
         JOIN users u ON u.id = s.shared_with_user_id
         WHERE s.workspace_id = ?1 AND s.is_active = 1
         ORDER BY s.created_at DESC, s.id DESC",
    )?;
    let rows = stmt
        .query_map([workspace_id], |row| {
            Ok(ShareWithUserRow {
                share: map_share_row(row)?,
                username: row.get(9)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// List workspaces actively shared with a user, joined with owner
/// usernames, excluding expired shares and soft-deleted workspaces.
/// Most-recently-used first, tie-broken by recency of grant.
pub fn list_shared_with(
    conn: &Connection,
    user_id: &str,
    now: u64,
) -> Result<Vec<SharedWorkspaceRow>> {
    let mut stmt = conn.prepare(
        "SELECT w.id, w.name, w.owner_id, u.username, w.updated_at,
                s.created_at, s.expires_at, s.last_accessed_at
         FROM workspace_shares s
         JOIN workspaces w ON w.id = s.workspace_id
         JOIN users u ON u.id = w.owner_id
         WHERE s.shared_with_user_id = ?1 AND s.is_active = 1
           AND (s.expires_at IS NULL OR s.expires_at > ?2)
           AND w.deleted_at IS NULL
         ORDER BY s.last_accessed_at DESC NULLS LAST, s.created_at DESC",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![user_id, now as i64], |row| {
            Ok(SharedWorkspaceRow {
                workspace_id: row.get(0)?,
                name: row.get(1)?,
                owner_id: row.get(2)?,
                owner_username: row.get(3)?,
                updated_at: row.get::<_, i64>(4)? as u64,
                shared_at: row.get::<_, i64>(5)? as u64,
                expires_at: row.get::<_, Option<i64>>(6)?.map(|t| t as u64),
                last_accessed_at: row.get::<_, Option<i64>>(7)?.map(|t| t as u64),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Count active shares for a `(workspace, recipient)` pair. Invariant
/// checks in tests use this.
pub fn count_active(
    conn: &Connection,
    workspace_id: &str,
    shared_with_user_id: &str,
) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM workspace_shares
         WHERE workspace_id = ?1 AND shared_with_user_id = ?2 AND is_active = 1",
        [workspace_id, shared_with_user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

const COLS: &str = "id, workspace_id, owner_id, shared_with_user_id, permission_level,
                    created_at, expires_at, last_accessed_at, is_active";

fn map_share_row(row: &rusqlite::Row<'_>) -> std::result::Result<ShareRow, rusqlite::Error> {
    Ok(ShareRow {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        owner_id: row.get(2)?,
        shared_with_user_id: row.get(3)?,
        permission_level: row.get(4)?,
        created_at: row.get::<_, i64>(5)? as u64,
        expires_at: row.get::<_, Option<i64>>(6)?.map(|t| t as u64),
        last_accessed_at: row.get::<_, Option<i64>>(7)?.map(|t| t as u64),
        is_active: row.get(8)?,
    })
}

/// A raw share row.
#[derive(Debug, Clone)]
pub struct ShareRow {
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

/// A share joined with its recipient's username.
#[derive(Debug, Clone)]
pub struct ShareWithUserRow {
    pub share: ShareRow,
    pub username: String,
}

/// A workspace as seen from the recipient's shared-with-me list.
#[derive(Debug, Clone)]
pub struct SharedWorkspaceRow {
    pub workspace_id: String,
    pub name: String,
    pub owner_id: String,
    pub owner_username: String,
    pub updated_at: u64,
    pub shared_at: u64,
    pub expires_at: Option<u64>,
    pub last_accessed_at: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{users, workspaces};

    fn test_db() -> Connection {
        let conn = crate::open_memory().expect("open test db");
        users::insert(&conn, "u1", "alice", 1000).expect("user");
        users::insert(&conn, "u2", "bob", 1000).expect("user");
        users::insert(&conn, "u3", "carol", 1000).expect("user");
        workspaces::insert(&conn, "w1", "u1", "Plans", "{}", 1000).expect("ws");
        conn
    }

    #[test]
    fn test_insert_and_find_active() {
        let conn = test_db();
        let id = insert(&conn, "w1", "u1", "u2", None, 2000).expect("insert");

        let share = find_active(&conn, "w1", "u2").expect("find").expect("present");
        assert_eq!(share.id, id);
        assert_eq!(share.permission_level, "view");
        assert!(share.is_active);
        assert!(share.expires_at.is_none());
    }

    #[test]
    fn test_duplicate_active_share_rejected() {
        let conn = test_db();
        insert(&conn, "w1", "u1", "u2", None, 2000).expect("first");

        let err = insert(&conn, "w1", "u1", "u2", None, 2001)
            .expect_err("second active share must hit the partial index");
        assert!(err.is_constraint_violation());
        assert_eq!(count_active(&conn, "w1", "u2").expect("count"), 1);
    }

    #[test]
    fn test_regrant_after_deactivation() {
        let conn = test_db();
        let id = insert(&conn, "w1", "u1", "u2", None, 2000).expect("first");
        assert_eq!(deactivate(&conn, id).expect("deactivate"), 1);

        // Inactive history row does not block a fresh grant.
        insert(&conn, "w1", "u1", "u2", None, 3000).expect("regrant");
        assert_eq!(count_active(&conn, "w1", "u2").expect("count"), 1);
    }

    #[test]
    fn test_deactivate_idempotent() {
        let conn = test_db();
        let id = insert(&conn, "w1", "u1", "u2", None, 2000).expect("insert");

        assert_eq!(deactivate(&conn, id).expect("first"), 1);
        assert_eq!(deactivate(&conn, id).expect("second"), 0);
    }

    #[test]
    fn test_deactivate_by_recipient_scoped_to_owner() {
        let conn = test_db();
        insert(&conn, "w1", "u1", "u2", None, 2000).expect("insert");

        // Wrong owner matches nothing.
        assert!(deactivate_by_recipient(&conn, "w1", "u3", "u2")
            .expect("revoke")
            .is_none());
        let id = deactivate_by_recipient(&conn, "w1", "u1", "u2")
            .expect("revoke")
            .expect("deactivated");
        assert!(!get(&conn, id).expect("get").expect("row").is_active);
    }

    #[test]
    fn test_list_for_workspace_newest_first() {
        let conn = test_db();
        insert(&conn, "w1", "u1", "u2", None, 2000).expect("insert");
        insert(&conn, "w1", "u1", "u3", None, 3000).expect("insert");

        let shares = list_for_workspace(&conn, "w1").expect("list");
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].username, "carol");
        assert_eq!(shares[1].username, "bob");
    }

    #[test]
    fn test_shared_with_me_ordering_and_filters() {
        let conn = test_db();
        workspaces::insert(&conn, "w2", "u1", "Notes", "{}", 1000).expect("ws");
        workspaces::insert(&conn, "w3", "u1", "Old", "{}", 1000).expect("ws");

        let a = insert(&conn, "w1", "u1", "u2", None, 2000).expect("share w1");
        insert(&conn, "w2", "u1", "u2", None, 3000).expect("share w2");
        insert(&conn, "w3", "u1", "u2", None, 4000).expect("share w3");

        // w1 was accessed, so it leads despite the older grant.
        touch_last_accessed(&conn, a, 9000).expect("touch");
        // w3's workspace is soft-deleted and must vanish.
        workspaces::soft_delete(&conn, "w3", 9500).expect("delete");

        let list = list_shared_with(&conn, "u2", 10_000).expect("list");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].workspace_id, "w1");
        assert_eq!(list[1].workspace_id, "w2");
        assert_eq!(list[0].owner_username, "alice");
    }

    #[test]
    fn test_shared_with_me_excludes_expired() {
        let conn = test_db();
        insert(&conn, "w1", "u1", "u2", Some(5000), 2000).expect("share");

        assert_eq!(list_shared_with(&conn, "u2", 4000).expect("list").len(), 1);
        assert!(list_shared_with(&conn, "u2", 6000).expect("list").is_empty());
    }
}
