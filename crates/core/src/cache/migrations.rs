//! Versioned schema migrations for the cache storage database.
//!
//! Applied versions are recorded in `schema_version`. Each pending migration
//! runs in its own transaction together with its version row, so a failed
//! batch leaves neither a half-applied schema nor a recorded version.

use super::Error;
use tokio_rusqlite::{Connection, params, rusqlite};

/// Ordered (version, SQL) pairs. Versions only ever grow.
const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../../migrations/001_cache_storage.sql"))];

/// Highest schema version this build knows about.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map_or(0, |(version, _)| *version)
}

/// Apply every migration newer than the database's recorded version.
///
/// Returns the number of migrations applied.
pub async fn run(conn: &Connection) -> Result<usize, Error> {
    conn.call(|conn| -> Result<usize, Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current: i64 = conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| {
            row.get(0)
        })?;

        if current > latest_version() {
            return Err(Error::MigrationFailed(format!(
                "database schema version {current} is newer than supported version {}",
                latest_version()
            )));
        }

        let mut applied = 0;
        for (version, sql) in MIGRATIONS.iter().filter(|(version, _)| *version > current) {
            apply(conn, *version, sql)?;
            tracing::debug!(version, "applied cache storage migration");
            applied += 1;
        }

        Ok(applied)
    })
    .await
    .map_err(Error::from)
}

fn apply(conn: &mut rusqlite::Connection, version: i64, sql: &str) -> Result<(), Error> {
    let tx = conn.transaction()?;
    tx.execute_batch(sql)
        .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
    tx.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
        params![version, chrono::Utc::now().to_rfc3339()],
    )?;
    tx.commit()?;
    Ok(())
}
