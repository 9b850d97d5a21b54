//! Database connection management with pragma configuration.
//!
//! This module handles opening the SQLite database, applying required pragmas
//! for performance and concurrency (WAL mode), and running migrations.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
                       PRAGMA synchronous=NORMAL;
                       PRAGMA temp_store=MEMORY;
                       PRAGMA foreign_keys=ON;";

/// Handle to every named cache store held in one SQLite database.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread. Cloning is cheap and shares the connection.
#[derive(Clone, Debug)]
pub struct CacheStorage {
    pub(crate) conn: Connection,
}

impl CacheStorage {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations.
    pub async fn open_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).await.map_err(|e| Error::Database(e.into()))?;
        let storage = Self::init(conn).await?;
        tracing::info!(path = %path.display(), "opened cache storage");
        Ok(storage)
    }

    /// Open an in-memory database for testing.
    ///
    /// Creates a temporary in-memory SQLite database with the same
    /// pragma configuration as file-based databases.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Close the underlying connection.
    ///
    /// Every clone shares the connection, so any clone still held afterwards
    /// fails each call with a database error.
    pub async fn close(self) -> Result<(), Error> {
        self.conn.close().await.map_err(Error::from)?;
        tracing::debug!("closed cache storage");
        Ok(())
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        let applied = migrations::run(&conn).await?;
        if applied > 0 {
            tracing::info!(applied, version = migrations::latest_version(), "migrated cache storage schema");
        }

        Ok(Self { conn })
    }
}
