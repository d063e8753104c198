use super::{whole_seconds, RecordStore};
use crate::error::StoreError;
use crate::power::record::base_key;
use crate::power::PowerRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{query, query_as, FromRow, SqlitePool};
use std::str::FromStr;
use tracing::info;

pub struct SqliteStore {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct PowerRow {
    owner_id: String,
    base_name: String,
    raw: String,
    total_minutes: i64,
    set_at: i64,
    warned: bool,
    version: i64,
}

impl From<PowerRow> for PowerRecord {
    fn from(row: PowerRow) -> Self {
        PowerRecord {
            owner_id: row.owner_id,
            base_name: row.base_name,
            raw: row.raw,
            total_minutes: row.total_minutes,
            set_at: DateTime::from_timestamp(row.set_at, 0).unwrap_or_default(),
            warned: row.warned,
            version: row.version,
        }
    }
}

const COLUMNS: &str = "owner_id, base_name, raw, total_minutes, set_at, warned, version";

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        info!("using sqlite power store at {database_url}");
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        query(
            r"CREATE TABLE IF NOT EXISTS power_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id TEXT NOT NULL,
                base_key TEXT NOT NULL,
                base_name TEXT NOT NULL,
                raw TEXT NOT NULL,
                total_minutes INTEGER NOT NULL,
                set_at INTEGER NOT NULL,
                warned INTEGER NOT NULL DEFAULT 0,
                version INTEGER NOT NULL DEFAULT 1,
                UNIQUE (owner_id, base_key)
            )",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn upsert(
        &self, owner_id: &str, base_name: &str, raw: &str, total_minutes: i64,
        now: DateTime<Utc>,
    ) -> Result<PowerRecord, StoreError> {
        let set_at = whole_seconds(now).timestamp();
        // single statement, so the reset and version bump are atomic
        let row = query_as::<_, PowerRow>(&format!(
            r"INSERT INTO power_records (owner_id, base_key, base_name, raw, total_minutes, set_at, warned)
            VALUES (?, ?, ?, ?, ?, ?, 0)
            ON CONFLICT (owner_id, base_key) DO UPDATE SET
                raw = excluded.raw, total_minutes = excluded.total_minutes,
                set_at = excluded.set_at, warned = 0, version = power_records.version + 1
            RETURNING {COLUMNS}"
        ))
        .bind(owner_id)
        .bind(base_key(base_name))
        .bind(base_name)
        .bind(raw)
        .bind(total_minutes)
        .bind(set_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn get_by_owner(&self, owner_id: &str) -> Result<Vec<PowerRecord>, StoreError> {
        let rows = query_as::<_, PowerRow>(&format!(
            "SELECT {COLUMNS} FROM power_records WHERE owner_id = ? ORDER BY id ASC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PowerRecord::from).collect())
    }

    async fn get_all(&self) -> Result<Vec<PowerRecord>, StoreError> {
        let rows = query_as::<_, PowerRow>(&format!(
            "SELECT {COLUMNS} FROM power_records ORDER BY owner_id, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PowerRecord::from).collect())
    }

    async fn mark_warned(
        &self, owner_id: &str, base_name: &str, version: i64,
    ) -> Result<bool, StoreError> {
        let updated = query(
            "UPDATE power_records SET warned = 1 WHERE owner_id = ? AND base_key = ? AND version = ?",
        )
        .bind(owner_id)
        .bind(base_key(base_name))
        .bind(version)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(updated > 0)
    }

    async fn remove(&self, owner_id: &str, base_name: &str) -> Result<bool, StoreError> {
        let deleted = query("DELETE FROM power_records WHERE owner_id = ? AND base_key = ?")
            .bind(owner_id)
            .bind(base_key(base_name))
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::contract;
    use super::*;
    use std::sync::Arc;

    async fn memory_store() -> SqliteStore {
        // every connection to :memory: is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteStore::from_pool(pool).await.unwrap()
    }

    #[tokio::test]
    async fn upsert_replaces_same_base() {
        contract::upsert_replaces_same_base(&memory_store().await).await;
    }

    #[tokio::test]
    async fn records_are_scoped_by_owner() {
        contract::records_are_scoped_by_owner(&memory_store().await).await;
    }

    #[tokio::test]
    async fn mark_warned_ignores_stale_version() {
        contract::mark_warned_ignores_stale_version(&memory_store().await).await;
    }

    #[tokio::test]
    async fn re_set_within_a_second_is_not_marked() {
        contract::re_set_within_a_second_is_not_marked(&memory_store().await).await;
    }

    #[tokio::test]
    async fn remove_deletes_only_that_base() {
        contract::remove_deletes_only_that_base(&memory_store().await).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_upserts_stay_consistent() {
        contract::concurrent_upserts_stay_consistent(Arc::new(memory_store().await)).await;
    }

    #[tokio::test]
    async fn reopening_a_file_database_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("power.db").display());
        {
            let store = SqliteStore::connect(&url).await.unwrap();
            store.upsert("1", "Alpha", "1d", 1440, contract::t0()).await.unwrap();
        }
        let store = SqliteStore::connect(&url).await.unwrap();
        let records = store.get_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].set_at, contract::t0());
    }
}
