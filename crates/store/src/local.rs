//! Local cache adapter: the whole record set in one JSON slot.

use std::path::PathBuf;

use async_trait::async_trait;
use bounce_core::check::{CheckFields, CheckPatch, CheckRecord};
use bounce_core::types::CheckId;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::slot::JsonSlot;
use crate::{BackendKind, RecordStore};

/// Record store over a [`JsonSlot`] holding a JSON array of records.
///
/// Identifiers are epoch milliseconds, bumped past the largest numeric id
/// already stored so two creates in the same millisecond stay unique.
/// Read-modify-write cycles are serialized through a mutex.
pub struct LocalCacheStore {
    slot: JsonSlot,
    lock: Mutex<()>,
}

impl LocalCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            slot: JsonSlot::new(path),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<CheckRecord>, StoreError> {
        Ok(self.slot.load().await?.unwrap_or_default())
    }

    /// Fails when the largest stored id leaves no room above it.
    fn next_id(records: &[CheckRecord]) -> Result<CheckId, StoreError> {
        let now = chrono::Utc::now().timestamp_millis();
        let highest = records
            .iter()
            .filter_map(|r| r.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        let next = highest
            .checked_add(1)
            .ok_or_else(|| StoreError::Corrupt(format!("no id above {highest} is available")))?;
        Ok(now.max(next).to_string())
    }
}

#[async_trait]
impl RecordStore for LocalCacheStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn list(&self) -> Result<Vec<CheckRecord>, StoreError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn get(&self, id: &str) -> Result<CheckRecord, StoreError> {
        let _guard = self.lock.lock().await;
        self.load()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn create(&self, fields: &CheckFields) -> Result<CheckRecord, StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let record = CheckRecord::new(Self::next_id(&records)?, fields.clone());
        records.push(record.clone());
        self.slot.save(&records).await?;
        tracing::debug!(id = %record.id, path = %self.slot.path().display(), "Check written to local cache");
        Ok(record)
    }

    async fn update(&self, id: &str, patch: &CheckPatch) -> Result<CheckRecord, StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply(&mut record.fields);
        let updated = record.clone();
        self.slot.save(&records).await?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.slot.save(&records).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.load().await.map(|_| ())
    }
}
