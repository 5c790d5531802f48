//! Share-activity query functions.
//!
//! The activity trail is append-only: an insert and a bounded read are
//! the only operations. Rows reference shares and links through their
//! metadata, not foreign keys, so the trail stays valid after a grant
//! is revoked.

use rusqlite::Connection;

use crate::Result;

/// Append an activity record.
pub fn insert(
    conn: &Connection,
    workspace_id: &str,
    user_id: Option<&str>,
    share_type: &str,
    action: &str,
    created_at: u64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO share_activity (workspace_id, user_id, share_type, action, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![workspace_id, user_id, share_type, action, created_at as i64],
    )?;
    Ok(())
}

/// Most recent activity for a workspace, newest first.
pub fn recent(conn: &Connection, workspace_id: &str, limit: u32) -> Result<Vec<ActivityRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, workspace_id, user_id, share_type, action, created_at
         FROM share_activity
         WHERE workspace_id = ?1
         ORDER BY created_at DESC, id DESC
         LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![workspace_id, limit], |row| {
            Ok(ActivityRow {
                id: row.get(0)?,
                workspace_id: row.get(1)?,
                user_id: row.get(2)?,
                share_type: row.get(3)?,
                action: row.get(4)?,
                created_at: row.get::<_, i64>(5)? as u64,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// A raw activity row.
#[derive(Debug, Clone)]
pub struct ActivityRow {
    pub id: i64,
    pub workspace_id: String,
    pub user_id: Option<String>,
    pub share_type: String,
    pub action: String,
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    #[test]
    fn test_insert_and_recent() {
        let conn = test_db();
        insert(&conn, "w1", Some("u2"), "direct_share", "share_granted", 1000).expect("insert");
        insert(&conn, "w1", None, "link_share", "viewed", 2000).expect("insert");
        insert(&conn, "w2", Some("u3"), "direct_share", "share_granted", 3000).expect("insert");

        let rows = recent(&conn, "w1", 10).expect("recent");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].action, "viewed");
        assert!(rows[0].user_id.is_none(), "anonymous link viewers have no user id");
        assert_eq!(rows[1].action, "share_granted");
    }

    #[test]
    fn test_recent_respects_limit() {
        let conn = test_db();
        for i in 0..5 {
            insert(&conn, "w1", None, "link_share", "viewed", 1000 + i).expect("insert");
        }
        assert_eq!(recent(&conn, "w1", 3).expect("recent").len(), 3);
    }
}
