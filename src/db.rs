use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::scope::{Scope, ScopeStorage};

/// Settings key holding the persisted scope document.
pub const SCOPE_KEY: &str = "dashboard_scope_v1";
/// Settings key holding the configured REST backend base URL.
pub const BACKEND_URL_KEY: &str = "backend.base_url";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("dashboard.sqlite3");
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;

    Ok(conn)
}

/// Read a settings document. A missing key and a corrupt row both come
/// back as `None`; callers fall back to their defaults.
pub fn settings_get_json(
    conn: &Connection,
    key: &str,
) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key = ?", [key], |r| {
            r.get(0)
        })
        .optional()?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    Ok(serde_json::from_str(&raw).ok())
}

pub fn settings_set_json(
    conn: &Connection,
    key: &str,
    value: &serde_json::Value,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value, updated_at) VALUES(?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        (
            key,
            serde_json::to_string(value)?,
            chrono::Utc::now().to_rfc3339(),
        ),
    )?;
    Ok(())
}

/// Scope persistence over the workspace settings table. Owns its own
/// connection so the store can write without sharing the IPC handle.
pub struct SqliteScopeStorage {
    conn: Connection,
}

impl SqliteScopeStorage {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        Ok(SqliteScopeStorage {
            conn: open_db(workspace)?,
        })
    }
}

impl ScopeStorage for SqliteScopeStorage {
    fn load(&self) -> Option<Scope> {
        let value = settings_get_json(&self.conn, SCOPE_KEY).ok().flatten()?;
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    fn save(&self, scope: &Scope) -> anyhow::Result<()> {
        settings_set_json(&self.conn, SCOPE_KEY, &serde_json::to_value(scope)?)
    }
}
