use super::{whole_seconds, RecordStore};
use crate::error::StoreError;
use crate::power::record::base_key;
use crate::power::PowerRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::info;

/// One base as it sits in the data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileEntry {
    base_name: String,
    raw: String,
    minutes: i64,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    warned: bool,
    /// Files written by older versions of the bot have none.
    #[serde(default)]
    version: i64,
}

/// owner id -> bases in the order they were first set
type PowerData = BTreeMap<String, Vec<FileEntry>>;

/// Keeps every record in memory and rewrites the whole file on each change.
/// Meant for a single bot process owning the file.
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<PowerData>,
}

impl JsonFileStore {
    pub async fn open(path: PathBuf) -> Result<Self, StoreError> {
        let data = match fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => PowerData::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == ErrorKind::NotFound => PowerData::new(),
            Err(e) => return Err(e.into()),
        };
        info!(
            "loaded {} power records from {}",
            data.values().map(Vec::len).sum::<usize>(),
            path.display()
        );
        Ok(Self { path, data: Mutex::new(data) })
    }

    /// Writes to a sibling temp file first so a crash never leaves half a file.
    async fn save(&self, data: &PowerData) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(data)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Applies `change` to a copy of the data and only keeps it once it is on disk.
    async fn update<T>(
        &self, change: impl FnOnce(&mut PowerData) -> T,
    ) -> Result<T, StoreError> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let result = change(&mut next);
        self.save(&next).await?;
        *data = next;
        Ok(result)
    }
}

fn to_record(owner_id: &str, entry: &FileEntry) -> PowerRecord {
    PowerRecord {
        owner_id: owner_id.to_string(),
        base_name: entry.base_name.clone(),
        raw: entry.raw.clone(),
        total_minutes: entry.minutes,
        set_at: entry.timestamp,
        warned: entry.warned,
        version: entry.version,
    }
}

fn find_entry<'a>(
    data: &'a mut PowerData, owner_id: &str, base_name: &str,
) -> Option<&'a mut FileEntry> {
    let key = base_key(base_name);
    data.get_mut(owner_id)?
        .iter_mut()
        .find(|entry| base_key(&entry.base_name) == key)
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn upsert(
        &self, owner_id: &str, base_name: &str, raw: &str, total_minutes: i64,
        now: DateTime<Utc>,
    ) -> Result<PowerRecord, StoreError> {
        let timestamp = whole_seconds(now);
        self.update(|data| {
            if let Some(entry) = find_entry(data, owner_id, base_name) {
                entry.raw = raw.to_string();
                entry.minutes = total_minutes;
                entry.timestamp = timestamp;
                entry.warned = false;
                entry.version += 1;
                return to_record(owner_id, entry);
            }
            let entry = FileEntry {
                base_name: base_name.to_string(),
                raw: raw.to_string(),
                minutes: total_minutes,
                timestamp,
                warned: false,
                version: 1,
            };
            let record = to_record(owner_id, &entry);
            data.entry(owner_id.to_string()).or_default().push(entry);
            record
        })
        .await
    }

    async fn get_by_owner(&self, owner_id: &str) -> Result<Vec<PowerRecord>, StoreError> {
        let data = self.data.lock().await;
        Ok(data
            .get(owner_id)
            .map(|entries| entries.iter().map(|e| to_record(owner_id, e)).collect())
            .unwrap_or_default())
    }

    async fn get_all(&self) -> Result<Vec<PowerRecord>, StoreError> {
        let data = self.data.lock().await;
        Ok(data
            .iter()
            .flat_map(|(owner_id, entries)| entries.iter().map(|e| to_record(owner_id, e)))
            .collect())
    }

    async fn mark_warned(
        &self, owner_id: &str, base_name: &str, version: i64,
    ) -> Result<bool, StoreError> {
        let mut data = self.data.lock().await;
        let Some(entry) = find_entry(&mut data, owner_id, base_name) else {
            return Ok(false);
        };
        if entry.version != version {
            return Ok(false);
        }
        if entry.warned {
            return Ok(true);
        }
        let mut next = data.clone();
        if let Some(entry) = find_entry(&mut next, owner_id, base_name) {
            entry.warned = true;
        }
        self.save(&next).await?;
        *data = next;
        Ok(true)
    }

    async fn remove(&self, owner_id: &str, base_name: &str) -> Result<bool, StoreError> {
        let key = base_key(base_name);
        self.update(|data| {
            let Some(entries) = data.get_mut(owner_id) else {
                return false;
            };
            let before = entries.len();
            entries.retain(|entry| base_key(&entry.base_name) != key);
            let removed = entries.len() != before;
            if entries.is_empty() {
                data.remove(owner_id);
            }
            removed
        })
        .await
    }
}
