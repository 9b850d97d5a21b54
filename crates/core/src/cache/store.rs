//! Entry operations on a single named store.
//!
//! Provides functions for storing, matching, listing, and deleting
//! cached responses keyed by request identity.

use super::entry::{AssetRequest, AssetResponse};
use crate::Error;
use bytes::Bytes;
use tokio_rusqlite::{Connection, params, rusqlite};
use url::Url;

/// Handle to one named store inside a [`CacheStorage`](super::CacheStorage).
#[derive(Clone, Debug)]
pub struct Store {
    conn: Connection,
    name: String,
}

/// Raw row read back from the `entries` table.
type EntryRow = (String, i64, String, Vec<u8>);

impl Store {
    pub(crate) fn new(conn: Connection, name: String) -> Self {
        Self { conn, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the stored response for `request`.
    ///
    /// Returns None if the request has no entry in this store.
    pub async fn match_request(&self, request: &AssetRequest) -> Result<Option<AssetResponse>, Error> {
        let name = self.name.clone();
        let key_hash = request.cache_key();

        let row = self
            .conn
            .call(move |conn| -> Result<Option<EntryRow>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT final_url, status, headers_json, body
                     FROM entries WHERE cache_name = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![name, key_hash], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                });

                match result {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(decode_response).transpose()
    }

    /// Insert or replace the entry for `request`.
    pub async fn put(&self, request: &AssetRequest, response: &AssetResponse) -> Result<(), Error> {
        self.put_all(vec![(request.clone(), response.clone())]).await?;
        Ok(())
    }

    /// Insert or replace several entries in one transaction.
    ///
    /// Either every entry is committed or none is. Returns the number of
    /// entries written.
    pub async fn put_all(&self, entries: Vec<(AssetRequest, AssetResponse)>) -> Result<usize, Error> {
        let name = self.name.clone();
        let stored_at = chrono::Utc::now().to_rfc3339();

        let mut rows = Vec::with_capacity(entries.len());
        for (request, response) in entries {
            let headers_json =
                serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(e.to_string()))?;
            rows.push((request, response, headers_json));
        }

        let written = self
            .conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
                    params![name, stored_at],
                )?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO entries (
                            cache_name, key_hash, method, url, final_url,
                            status, headers_json, body, stored_at
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                        ON CONFLICT(cache_name, key_hash) DO UPDATE SET
                            method = excluded.method,
                            url = excluded.url,
                            final_url = excluded.final_url,
                            status = excluded.status,
                            headers_json = excluded.headers_json,
                            body = excluded.body,
                            stored_at = excluded.stored_at",
                    )?;
                    for (request, response, headers_json) in &rows {
                        stmt.execute(params![
                            &name,
                            request.cache_key(),
                            &request.method,
                            request.url.as_str(),
                            &response.url,
                            response.status as i64,
                            headers_json,
                            response.body.as_ref(),
                            &stored_at,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(rows.len())
            })
            .await
            .map_err(Error::from)?;

        tracing::debug!(cache = %self.name, entries = written, "stored responses");
        Ok(written)
    }

    /// Remove the entry for `request`.
    ///
    /// Returns false if there was nothing to remove.
    pub async fn delete(&self, request: &AssetRequest) -> Result<bool, Error> {
        let name = self.name.clone();
        let key_hash = request.cache_key();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM entries WHERE cache_name = ?1 AND key_hash = ?2",
                    params![name, key_hash],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Request identities held by this store, in insertion order.
    pub async fn keys(&self) -> Result<Vec<AssetRequest>, Error> {
        let name = self.name.clone();
        let rows = self
            .conn
            .call(move |conn| -> Result<Vec<(String, String)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url FROM entries WHERE cache_name = ?1
                     ORDER BY stored_at ASC, rowid ASC",
                )?;
                let rows = stmt
                    .query_map(params![name], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        rows.into_iter()
            .map(|(method, url)| {
                let url = Url::parse(&url).map_err(|e| Error::CorruptEntry(format!("{url}: {e}")))?;
                Ok(AssetRequest::new(&method, url))
            })
            .collect()
    }

    /// Number of entries in this store.
    pub async fn len(&self) -> Result<u64, Error> {
        let name = self.name.clone();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE cache_name = ?1", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

fn decode_response((final_url, status, headers_json, body): EntryRow) -> Result<AssetResponse, Error> {
    let status = u16::try_from(status).map_err(|_| Error::CorruptEntry(format!("status {status} out of range")))?;
    let headers: Vec<(String, String)> =
        serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(e.to_string()))?;
    Ok(AssetResponse { url: final_url, status, headers, body: Bytes::from(body) })
}
