//! Session lookup functions.
//!
//! Sessions are issued by the excluded auth subsystem. The share engine
//! resolves a bearer token to a `(user_id, username)` principal and
//! trusts the result as-is.

use rusqlite::Connection;

use crate::Result;

/// Insert a session. Only fixtures and the auth subsystem call this.
pub fn insert(
    conn: &Connection,
    token: &str,
    user_id: &str,
    created_at: u64,
    expires_at: Option<u64>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO sessions (token, user_id, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![token, user_id, created_at as i64, expires_at.map(|t| t as i64)],
    )?;
    Ok(())
}

/// Resolve a bearer token to its principal.
///
/// Returns `None` for unknown tokens, expired sessions, and sessions
/// belonging to deactivated users.
pub fn find_principal(conn: &Connection, token: &str, now: u64) -> Result<Option<PrincipalRow>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.username FROM sessions s
         JOIN users u ON u.id = s.user_id
         WHERE s.token = ?1
           AND (s.expires_at IS NULL OR s.expires_at > ?2)
           AND u.is_active = 1",
    )?;
    let mut rows = stmt.query_map(rusqlite::params![token, now as i64], |row| {
        Ok(PrincipalRow {
            user_id: row.get(0)?,
            username: row.get(1)?,
        })
    })?;
    rows.next().transpose().map_err(Into::into)
}

/// A resolved principal.
#[derive(Debug, Clone)]
pub struct PrincipalRow {
    pub user_id: String,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::users;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    #[test]
    fn test_resolve_token() {
        let conn = test_db();
        users::insert(&conn, "u1", "alice", 1000).expect("user");
        insert(&conn, "tok-1", "u1", 1000, None).expect("session");

        let p = find_principal(&conn, "tok-1", 2000)
            .expect("query")
            .expect("present");
        assert_eq!(p.user_id, "u1");
        assert_eq!(p.username, "alice");
    }

    #[test]
    fn test_expired_session_rejected() {
        let conn = test_db();
        users::insert(&conn, "u1", "alice", 1000).expect("user");
        insert(&conn, "tok-1", "u1", 1000, Some(1500)).expect("session");

        assert!(find_principal(&conn, "tok-1", 2000).expect("query").is_none());
        assert!(find_principal(&conn, "tok-1", 1400).expect("query").is_some());
    }

    #[test]
    fn test_unknown_token() {
        let conn = test_db();
        assert!(find_principal(&conn, "nope", 0).expect("query").is_none());
    }
}
