//! A single JSON value persisted in one file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Key-value slot backed by a file. Writes replace the whole value
/// atomically (temporary file, then rename).
#[derive(Debug, Clone)]
pub struct JsonSlot {
    path: PathBuf,
}

impl JsonSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the slot. A missing file is `Ok(None)`.
    pub async fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(None),
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the slot contents, creating parent directories as needed.
    pub async fn save<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Remove the slot. Clearing an absent slot is not an error.
    pub async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_slot_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let slot = JsonSlot::new(dir.path().join("absent.json"));
        let value: Option<Vec<u32>> = slot.load().await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn save_creates_parents_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let slot = JsonSlot::new(dir.path().join("nested/deeper/slot.json"));
        slot.save(&vec![1, 2, 3]).await.unwrap();
        let value: Option<Vec<u32>> = slot.load().await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
        assert!(!dir.path().join("nested/deeper/slot.json.tmp").exists());
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let slot = JsonSlot::new(dir.path().join("slot.json"));
        slot.save(&"x").await.unwrap();
        slot.clear().await.unwrap();
        slot.clear().await.unwrap();
        assert!(slot.load::<String>().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn garbage_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slot.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();
        let result = JsonSlot::new(path).load::<Vec<u32>>().await;
        assert!(matches!(result, Err(StoreError::Json(_))));
    }
}
