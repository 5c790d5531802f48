//! Share-link query functions.
//!
//! A link grants view access to anyone holding its token, optionally
//! gated behind login. Lookup is exact-match on the token; resistance
//! to enumeration comes from token entropy, not from the query.

use rusqlite::Connection;

use crate::Result;

/// Insert a new active link and return its row id.
pub fn insert(
    conn: &Connection,
    workspace_id: &str,
    owner_id: &str,
    token: &str,
    requires_login: bool,
    expires_at: Option<u64>,
    created_at: u64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO share_links
         (workspace_id, owner_id, token, requires_login, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            workspace_id,
            owner_id,
            token,
            requires_login,
            created_at as i64,
            expires_at.map(|t| t as i64),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Whether a token already exists (active or not). Collision check for
/// token issuance; probabilistically unnecessary, kept as defense in
/// depth.
pub fn token_exists(conn: &Connection, token: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM share_links WHERE token = ?1",
        [token],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Find an active link by exact token match, joined with the owner's
/// username. Expiry is the caller's concern.
pub fn find_active_by_token(conn: &Connection, token: &str) -> Result<Option<LinkRow>> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.workspace_id, l.owner_id, l.token, l.requires_login,
                l.created_at, l.expires_at, l.access_count, l.is_active, u.username
         FROM share_links l
         JOIN users u ON u.id = l.owner_id
         WHERE l.token = ?1 AND l.is_active = 1",
    )?;
    let mut rows = stmt.query_map([token], map_link_row)?;
    rows.next().transpose().map_err(Into::into)
}

/// List active links for a workspace, newest first.
pub fn list_for_workspace(conn: &Connection, workspace_id: &str) -> Result<Vec<LinkRow>> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.workspace_id, l.owner_id, l.token, l.requires_login,
                l.created_at, l.expires_at, l.access_count, l.is_active, u.username
         FROM share_links l
         JOIN users u ON u.id = l.owner_id
         WHERE l.workspace_id = ?1 AND l.is_active = 1
         ORDER BY l.created_at DESC, l.id DESC",
    )?;
    let rows = stmt
        .query_map([workspace_id], map_link_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Deactivate a link. Returns the number of rows changed; zero is not
/// an error (lazy expiration and revocation may race, and flipping an
/// already-false flag is harmless).
pub fn deactivate(conn: &Connection, id: i64) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE share_links SET is_active = 0 WHERE id = ?1 AND is_active = 1",
        [id],
    )?;
    Ok(changed)
}

/// Deactivate a link by id, scoped to the owner's workspace. Returns
/// the number of rows changed.
pub fn deactivate_for_owner(
    conn: &Connection,
    workspace_id: &str,
    owner_id: &str,
    id: i64,
) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE share_links SET is_active = 0
         WHERE id = ?1 AND workspace_id = ?2 AND owner_id = ?3 AND is_active = 1",
        rusqlite::params![id, workspace_id, owner_id],
    )?;
    Ok(changed)
}

/// Increment the monotonic access counter.
pub fn increment_access_count(conn: &Connection, id: i64) -> Result<()> {
    conn.execute(
        "UPDATE share_links SET access_count = access_count + 1 WHERE id = ?1",
        [id],
    )?;
    Ok(())
}

/// Fetch a link by row id (tests and owner listings).
pub fn get(conn: &Connection, id: i64) -> Result<Option<LinkRow>> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.workspace_id, l.owner_id, l.token, l.requires_login,
                l.created_at, l.expires_at, l.access_count, l.is_active, u.username
         FROM share_links l
         JOIN users u ON u.id = l.owner_id
         WHERE l.id = ?1",
    )?;
    let mut rows = stmt.query_map([id], map_link_row)?;
    rows.next().transpose().map_err(Into::into)
}

fn map_link_row(row: &rusqlite::Row<'_>) -> std::result::Result<LinkRow, rusqlite::Error> {
    Ok(LinkRow {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        owner_id: row.get(2)?,
        token: row.get(3)?,
        requires_login: row.get(4)?,
        created_at: row.get::<_, i64>(5)? as u64,
        expires_at: row.get::<_, Option<i64>>(6)?.map(|t| t as u64),
        access_count: row.get::<_, i64>(7)? as u64,
        is_active: row.get(8)?,
        owner_username: row.get(9)?,
    })
}

/// A share-link row joined with its owner's username.
#[derive(Debug, Clone)]
pub struct LinkRow {
    pub id: i64,
    pub workspace_id: String,
    pub owner_id: String,
    pub token: String,
    pub requires_login: bool,
    pub created_at: u64,
    pub expires_at: Option<u64>,
    pub access_count: u64,
    pub is_active: bool,
    pub owner_username: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{users, workspaces};

    fn test_db() -> Connection {
        let conn = crate::open_memory().expect("open test db");
        users::insert(&conn, "u1", "alice", 1000).expect("user");
        workspaces::insert(&conn, "w1", "u1", "Plans", "{}", 1000).expect("ws");
        conn
    }

    #[test]
    fn test_insert_and_find_by_token() {
        let conn = test_db();
        let id = insert(&conn, "w1", "u1", "tok-abc", true, None, 2000).expect("insert");

        let link = find_active_by_token(&conn, "tok-abc")
            .expect("find")
            .expect("present");
        assert_eq!(link.id, id);
        assert_eq!(link.access_count, 0);
        assert!(link.requires_login);
        assert_eq!(link.owner_username, "alice");
    }

    #[test]
    fn test_token_unique() {
        let conn = test_db();
        insert(&conn, "w1", "u1", "tok-abc", true, None, 2000).expect("first");
        let err = insert(&conn, "w1", "u1", "tok-abc", false, None, 2001)
            .expect_err("duplicate token must fail");
        assert!(err.is_constraint_violation());
        assert!(token_exists(&conn, "tok-abc").expect("exists"));
        assert!(!token_exists(&conn, "tok-xyz").expect("exists"));
    }

    #[test]
    fn test_access_count_monotonic() {
        let conn = test_db();
        let id = insert(&conn, "w1", "u1", "tok-abc", false, None, 2000).expect("insert");

        increment_access_count(&conn, id).expect("inc");
        increment_access_count(&conn, id).expect("inc");
        let link = get(&conn, id).expect("get").expect("present");
        assert_eq!(link.access_count, 2);
    }

    #[test]
    fn test_deactivate_hides_from_token_lookup() {
        let conn = test_db();
        let id = insert(&conn, "w1", "u1", "tok-abc", true, None, 2000).expect("insert");

        assert_eq!(deactivate(&conn, id).expect("deactivate"), 1);
        assert_eq!(deactivate(&conn, id).expect("again"), 0);
        assert!(find_active_by_token(&conn, "tok-abc").expect("find").is_none());
    }

    #[test]
    fn test_deactivate_for_owner_scoped() {
        let conn = test_db();
        users::insert(&conn, "u2", "bob", 1000).expect("user");
        let id = insert(&conn, "w1", "u1", "tok-abc", true, None, 2000).expect("insert");

        assert_eq!(deactivate_for_owner(&conn, "w1", "u2", id).expect("wrong owner"), 0);
        assert_eq!(deactivate_for_owner(&conn, "w1", "u1", id).expect("owner"), 1);
    }
}
