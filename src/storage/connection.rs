//! Database connection setup
//!
//! Opens the SQLite index with WAL mode and creates the two tables: the
//! files table (keyed by normalized path, insertion-ordered by rowid) and
//! the directory completion ledger.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{MetaError, Result};

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    if let Some(db_dir) = db_path.parent() {
        if !db_dir.as_os_str().is_empty() {
            std::fs::create_dir_all(db_dir).map_err(MetaError::Io)?;
        }
    }

    let conn = Connection::open(db_path).map_err(MetaError::Database)?;
    configure(&conn)?;
    create_tables(&conn)?;

    tracing::info!("Database initialized at: {}", db_path.display());
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().map_err(MetaError::Database)?;
    create_tables(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<()> {
    // WAL mode for better concurrent access
    conn.pragma_update(None, "journal_mode", WAL)?;
    conn.pragma_update(None, "synchronous", NORMAL)?;
    Ok(())
}

fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS files (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            path TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            size_bytes INTEGER NOT NULL DEFAULT 0,
            created TEXT NOT NULL,
            modified TEXT NOT NULL,
            extension TEXT NOT NULL DEFAULT '',
            composite_text TEXT NOT NULL DEFAULT '',
            attributes TEXT NOT NULL DEFAULT '{}'
        );

        CREATE TABLE IF NOT EXISTS directories (
            path TEXT PRIMARY KEY,
            status TEXT NOT NULL,
            last_indexed_at TEXT NOT NULL
        );
    "#,
    )?;
    Ok(())
}

// SQL pragma constants
const WAL: &str = "WAL";
const NORMAL: &str = "NORMAL";
