//! User directory query functions.
//!
//! User rows are administered by the excluded auth subsystem; the share
//! engine only looks users up and searches them for the share dialog.

use rusqlite::Connection;

use crate::Result;

/// Insert a user. Only fixtures and the auth subsystem call this.
pub fn insert(conn: &Connection, id: &str, username: &str, created_at: u64) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, username, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![id, username, created_at as i64],
    )?;
    Ok(())
}

/// Look up an active user by id.
pub fn find_active(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username FROM users WHERE id = ?1 AND is_active = 1",
    )?;
    let mut rows = stmt.query_map([id], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            username: row.get(1)?,
        })
    })?;
    rows.next().transpose().map_err(Into::into)
}

/// Search active users by username substring, excluding one user id
/// (the caller never wants to see themselves in the share dialog).
pub fn search(
    conn: &Connection,
    pattern: &str,
    exclude_id: &str,
    limit: u32,
) -> Result<Vec<UserRow>> {
    // The escape character itself must be escaped first, or a trailing
    // backslash in the pattern would swallow the closing wildcard.
    let like = format!(
        "%{}%",
        pattern
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    );
    let mut stmt = conn.prepare(
        "SELECT id, username FROM users
         WHERE username LIKE ?1 ESCAPE '\\' AND id != ?2 AND is_active = 1
         ORDER BY username ASC
         LIMIT ?3",
    )?;
    let rows = stmt
        .query_map(
            rusqlite::params![like, exclude_id, limit],
            |row| {
                Ok(UserRow {
                    id: row.get(0)?,
                    username: row.get(1)?,
                })
            },
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// A user row.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    #[test]
    fn test_insert_and_find() {
        let conn = test_db();
        insert(&conn, "u1", "alice", 1000).expect("insert");

        let user = find_active(&conn, "u1").expect("find").expect("present");
        assert_eq!(user.username, "alice");

        assert!(find_active(&conn, "u2").expect("find").is_none());
    }

    #[test]
    fn test_inactive_user_not_found() {
        let conn = test_db();
        insert(&conn, "u1", "alice", 1000).expect("insert");
        conn.execute("UPDATE users SET is_active = 0 WHERE id = 'u1'", [])
            .expect("deactivate");

        assert!(find_active(&conn, "u1").expect("find").is_none());
    }

    #[test]
    fn test_search_excludes_caller() {
        let conn = test_db();
        insert(&conn, "u1", "alice", 1000).expect("insert");
        insert(&conn, "u2", "alicia", 1000).expect("insert");
        insert(&conn, "u3", "bob", 1000).expect("insert");

        let hits = search(&conn, "ali", "u1", 10).expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "u2");
    }

    #[test]
    fn test_search_escapes_like_wildcards() {
        let conn = test_db();
        insert(&conn, "u1", "alice", 1000).expect("insert");

        let hits = search(&conn, "%", "u0", 10).expect("search");
        assert!(hits.is_empty(), "literal % must not match everything");
    }

    #[test]
    fn test_search_escapes_backslash() {
        let conn = test_db();
        insert(&conn, "u1", "alice", 1000).expect("insert");
        insert(&conn, "u2", "a\\lice", 1000).expect("insert");

        // A trailing backslash must stay literal instead of escaping
        // the closing wildcard.
        let hits = search(&conn, "a\\", "u0", 10).expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "u2");
    }
}
