// src/db/connection.rs
//! Opening SQLite with runtime parameters.

use std::{fs, path::Path, time::Duration};
use rusqlite::Connection;
use crate::config::DatabaseConfig;
use super::StoreError;

pub fn open_db_connection(path: &Path, cfg: &DatabaseConfig) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.busy_timeout(Duration::from_millis(cfg.busy_timeout_ms))?;
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    conn.pragma_update(None, "synchronous", cfg.synchronous.as_str())?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    log::debug!("Opened {} (journal_mode={})", path.display(), mode);
    Ok(conn)
}

/// In-memory connection, used by tests.
pub fn open_in_memory() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}
