//! SQL schema definitions.

/// Complete schema for the Atelier v1 database.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Users & Sessions (owned by the auth subsystem / user
-- directory; the share engine only reads these)
-- ============================================================

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    created_at INTEGER NOT NULL,
    expires_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);

-- ============================================================
-- Workspaces (owned by the content store; read-only here)
-- ============================================================

CREATE TABLE IF NOT EXISTS workspaces (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL REFERENCES users(id),
    name TEXT NOT NULL,
    content TEXT NOT NULL DEFAULT '{}',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    deleted_at INTEGER
);

-- Workspace names are unique per owner among non-deleted workspaces.
CREATE UNIQUE INDEX IF NOT EXISTS idx_workspaces_owner_name
    ON workspaces(owner_id, name) WHERE deleted_at IS NULL;

-- ============================================================
-- Direct shares
-- ============================================================

CREATE TABLE IF NOT EXISTS workspace_shares (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    workspace_id TEXT NOT NULL REFERENCES workspaces(id),
    owner_id TEXT NOT NULL REFERENCES users(id),
    shared_with_user_id TEXT NOT NULL REFERENCES users(id),
    permission_level TEXT NOT NULL DEFAULT 'view',
    created_at INTEGER NOT NULL,
    expires_at INTEGER,
    last_accessed_at INTEGER,
    is_active INTEGER NOT NULL DEFAULT 1
);

-- At most one active share per (workspace, recipient). Concurrent
-- grants race on the check-then-insert; the second insert lands here.
CREATE UNIQUE INDEX IF NOT EXISTS idx_shares_active_unique
    ON workspace_shares(workspace_id, shared_with_user_id) WHERE is_active = 1;

CREATE INDEX IF NOT EXISTS idx_shares_recipient ON workspace_shares(shared_with_user_id);
CREATE INDEX IF NOT EXISTS idx_shares_workspace ON workspace_shares(workspace_id);

-- ============================================================
-- Share links
-- ============================================================

CREATE TABLE IF NOT EXISTS share_links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    workspace_id TEXT NOT NULL REFERENCES workspaces(id),
    owner_id TEXT NOT NULL REFERENCES users(id),
    token TEXT NOT NULL UNIQUE,
    requires_login INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    expires_at INTEGER,
    access_count INTEGER NOT NULL DEFAULT 0,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_links_workspace ON share_links(workspace_id);

-- ============================================================
-- Activity trail (append-only; no UPDATE/DELETE paths exist)
-- ============================================================

CREATE TABLE IF NOT EXISTS share_activity (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    workspace_id TEXT NOT NULL,
    user_id TEXT,
    share_type TEXT NOT NULL,
    action TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_activity_workspace ON share_activity(workspace_id, created_at);
"#;
