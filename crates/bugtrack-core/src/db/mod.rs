//! SQLite database bootstrap for the document store.
//!
//! Runtime defaults:
//! - `journal_mode = WAL` for file databases so readers never block the writer
//! - `busy_timeout = 5s` to ride out transient lock contention
//! - `foreign_keys = ON`

pub mod migrations;
pub mod schema;

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Busy timeout used for store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a connection string points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

impl StoreLocation {
    /// Parse a connection string.
    ///
    /// Accepted forms: `sqlite::memory:`, `:memory:`, `sqlite://<path>`,
    /// `sqlite:<path>`, `file:<path>`, or a bare filesystem path.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty string or an empty path after the scheme.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            bail!("database url is empty");
        }

        if matches!(url, ":memory:" | "sqlite::memory:" | "sqlite://:memory:") {
            return Ok(Self::Memory);
        }

        let path = ["sqlite://", "sqlite:", "file:"]
            .iter()
            .find_map(|scheme| url.strip_prefix(scheme))
            .unwrap_or(url);
        let path = path.split('?').next().unwrap_or_default();
        if path.is_empty() {
            bail!("database url '{url}' has no path");
        }

        Ok(Self::File(PathBuf::from(path)))
    }
}

/// Open (or create) the store database, apply runtime pragmas, and migrate
/// the schema to the latest version.
///
/// # Errors
///
/// Returns an error if the url is malformed or opening/configuring/migrating
/// the database fails.
pub fn open_store_db(url: &str) -> Result<Connection> {
    let mut conn = match StoreLocation::parse(url)? {
        StoreLocation::Memory => {
            Connection::open_in_memory().context("open in-memory store database")?
        }
        StoreLocation::File(path) => open_file(&path)?,
    };

    configure_connection(&conn).context("configure sqlite pragmas")?;
    migrations::migrate(&mut conn).context("apply store migrations")?;

    Ok(conn)
}

fn open_file(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create store db directory {}", parent.display()))?;
    }

    Connection::open(path).with_context(|| format!("open store database {}", path.display()))
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    // In-memory databases report "memory" and ignore the request.
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}
