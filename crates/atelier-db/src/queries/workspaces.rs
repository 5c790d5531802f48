//! Workspace query functions (content-store boundary).
//!
//! Workspace content is opaque to the share engine; these functions
//! exist so the engine can verify ownership and serve read-only views.
//! Soft delete is a `deleted_at` timestamp; deleted workspaces are
//! invisible to every query here.

use rusqlite::Connection;

use crate::Result;

/// Insert a workspace. Only fixtures and the content store call this.
pub fn insert(
    conn: &Connection,
    id: &str,
    owner_id: &str,
    name: &str,
    content: &str,
    created_at: u64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO workspaces (id, owner_id, name, content, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        rusqlite::params![id, owner_id, name, content, created_at as i64],
    )?;
    Ok(())
}

/// Look up the owner of a non-deleted workspace.
///
/// This is the authoritative ownership check: never cached, because
/// ownership does not expire.
pub fn owner_of(conn: &Connection, id: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare(
        "SELECT owner_id FROM workspaces WHERE id = ?1 AND deleted_at IS NULL",
    )?;
    let mut rows = stmt.query_map([id], |row| row.get::<_, String>(0))?;
    rows.next().transpose().map_err(Into::into)
}

/// Fetch a non-deleted workspace with its content blob.
pub fn get(conn: &Connection, id: &str) -> Result<Option<WorkspaceRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, name, content, created_at, updated_at
         FROM workspaces WHERE id = ?1 AND deleted_at IS NULL",
    )?;
    let mut rows = stmt.query_map([id], |row| {
        Ok(WorkspaceRow {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            content: row.get(3)?,
            created_at: row.get::<_, i64>(4)? as u64,
            updated_at: row.get::<_, i64>(5)? as u64,
        })
    })?;
    rows.next().transpose().map_err(Into::into)
}

/// Soft-delete a workspace. Only fixtures and the content store call this.
pub fn soft_delete(conn: &Connection, id: &str, deleted_at: u64) -> Result<()> {
    conn.execute(
        "UPDATE workspaces SET deleted_at = ?1 WHERE id = ?2",
        rusqlite::params![deleted_at as i64, id],
    )?;
    Ok(())
}

/// A workspace row.
#[derive(Debug, Clone)]
pub struct WorkspaceRow {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub content: String,
    pub created_at: u64,
    pub updated_at: u64,
}
