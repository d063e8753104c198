use crate::config::StorageConfig;
use crate::error::StoreError;
use crate::power::PowerRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

mod json_file;
mod sqlite;

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

/// Persistence for power records, keyed by owner and case-insensitive base name.
///
/// Every call is atomic with respect to the others, so a tick never reads a
/// half-written record.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts the base at version 1, or resets budget, `set_at` and `warned`
    /// and bumps the version if the owner already has a base by that name.
    async fn upsert(
        &self, owner_id: &str, base_name: &str, raw: &str, total_minutes: i64,
        now: DateTime<Utc>,
    ) -> Result<PowerRecord, StoreError>;

    async fn get_by_owner(&self, owner_id: &str) -> Result<Vec<PowerRecord>, StoreError>;

    async fn get_all(&self) -> Result<Vec<PowerRecord>, StoreError>;

    /// Flags the record as warned if it is still at `version`. Returns false
    /// when the record was re-set or removed in the meantime.
    async fn mark_warned(
        &self, owner_id: &str, base_name: &str, version: i64,
    ) -> Result<bool, StoreError>;

    async fn remove(&self, owner_id: &str, base_name: &str) -> Result<bool, StoreError>;
}

pub async fn open(config: &StorageConfig) -> Result<Arc<dyn RecordStore>, StoreError> {
    Ok(match config {
        StorageConfig::Sqlite { url } => Arc::new(SqliteStore::connect(url).await?),
        StorageConfig::File { path } => Arc::new(JsonFileStore::open(path.clone()).await?),
    })
}

/// Both backends keep timestamps at second precision.
fn whole_seconds(now: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}
