//! SQLite-backed persistence.
//!
//! # Responsibility
//! - Persist one store's records into the shared `records` table, scoped by
//!   `store_key`.
//!
//! # Invariants
//! - `save` replaces every row of its `store_key` inside one transaction.
//! - `load` returns rows in saved order (`position ASC`).
//! - Rows that fail to decode are reported, never skipped.

use crate::db::{open_db, open_db_in_memory};
use crate::model::payload::Payload;
use crate::model::record::{Record, RecordId};
use crate::persistence::PersistenceAdapter;
use crate::store::error::{StoreError, StoreResult};
use chrono::{DateTime, SecondsFormat, Utc};
use log::info;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    created_at,
    owner_refs,
    payload
FROM records
WHERE store_key = ?1
ORDER BY position ASC;";

#[derive(Debug)]
pub struct SqlitePersistence {
    conn: Mutex<Connection>,
    store_key: String,
}

impl SqlitePersistence {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>, store_key: impl Into<String>) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db(path)?, store_key))
    }

    pub fn in_memory(store_key: impl Into<String>) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?, store_key))
    }

    /// Wraps an already-migrated connection.
    pub fn from_connection(conn: Connection, store_key: impl Into<String>) -> Self {
        Self {
            conn: Mutex::new(conn),
            store_key: store_key.into(),
        }
    }

    pub fn store_key(&self) -> &str {
        &self.store_key
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: Payload> PersistenceAdapter<P> for SqlitePersistence {
    fn load(&self) -> StoreResult<Vec<Record<P>>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(RECORD_SELECT_SQL)?;
        let mut rows = stmt.query(params![self.store_key])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn save(&self, records: &[Record<P>]) -> StoreResult<()> {
        let started_at = Instant::now();
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM records WHERE store_key = ?1;",
            params![self.store_key],
        )?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO records (
                    store_key,
                    id,
                    position,
                    created_at,
                    owner_refs,
                    payload
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            )?;
            for (position, record) in records.iter().enumerate() {
                let owner_refs =
                    serde_json::to_string(&record.owner_refs).map_err(StoreError::Serialize)?;
                let payload =
                    serde_json::to_string(&record.payload).map_err(StoreError::Serialize)?;
                insert.execute(params![
                    self.store_key,
                    record.id.as_str(),
                    position as i64,
                    record
                        .created_at
                        .to_rfc3339_opts(SecondsFormat::Millis, true),
                    owner_refs,
                    payload,
                ])?;
            }
        }
        tx.commit()?;

        info!(
            "event=persistence_save module=persistence backend=sqlite status=ok store_key={} count={} duration_ms={}",
            self.store_key,
            records.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

fn parse_record_row<P: Payload>(row: &Row<'_>) -> StoreResult<Record<P>> {
    let id: String = row.get("id")?;

    let created_at_text: String = row.get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_text)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|_| {
            StoreError::InvalidData(format!(
                "invalid created_at `{created_at_text}` in records.created_at for `{id}`"
            ))
        })?;

    let owner_refs_text: String = row.get("owner_refs")?;
    let owner_refs: Vec<String> = serde_json::from_str(&owner_refs_text).map_err(|err| {
        StoreError::InvalidData(format!("invalid owner_refs for `{id}`: {err}"))
    })?;

    let payload_text: String = row.get("payload")?;
    let payload: P = serde_json::from_str(&payload_text)
        .map_err(|err| StoreError::InvalidData(format!("invalid payload for `{id}`: {err}")))?;

    Ok(Record {
        id: RecordId::new(id),
        created_at,
        owner_refs,
        payload,
    })
}
