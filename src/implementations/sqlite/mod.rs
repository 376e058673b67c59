//! SQLite metadata storage
//!
//! `SqliteMetadataStore` owns a single connection behind a mutex; create one
//! store and share it via `Arc` across everything that needs record access.
//! The schema is initialized on open. The trait implementation lives in the
//! `metadata` submodule.

use crate::error::{Error, Result};
use crate::notify::ChangeNotifier;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

mod metadata;

pub(crate) fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS assets (
            id          TEXT PRIMARY KEY,
            asset_type  TEXT NOT NULL,
            created_at  INTEGER NOT NULL,
            modified_at INTEGER,
            file_size   INTEGER NOT NULL,
            metadata    TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_assets_type ON assets(asset_type);
        CREATE INDEX IF NOT EXISTS idx_assets_created ON assets(created_at);
        "#,
    )
    .map_err(Error::write)?;
    Ok(())
}

/// SQLite-backed metadata store
pub struct SqliteMetadataStore {
    conn: Arc<Mutex<Connection>>,
    notifier: ChangeNotifier,
}

impl SqliteMetadataStore {
    /// Open or create a database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(&path).map_err(Error::write)?;
        Self::from_connection(conn)
    }

    /// Create an in-memory database (useful for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(Error::write)?;
        Self::from_connection(conn)
    }

    /// Replace the notification coalescing window (builder-style, before the
    /// store is shared)
    pub fn with_coalesce_window(mut self, window: Duration) -> Self {
        self.notifier = ChangeNotifier::with_window(window);
        self
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            notifier: ChangeNotifier::new(),
        })
    }

    /// Get access to the connection (for the trait implementation)
    pub(crate) fn conn(&self) -> &Arc<Mutex<Connection>> {
        &self.conn
    }

    pub(crate) fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}
