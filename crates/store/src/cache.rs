//! Last-known-good snapshot of the record list.
//!
//! Staleness policy: the snapshot is replaced after every successful list
//! and dropped after every successful write, so it never shows a state the
//! backend has since moved past through this process. A list that started
//! before a write finished is not remembered: callers take a [`Generation`]
//! before listing and [`SnapshotCache::remember`] ignores the result if a
//! write invalidated the cache meanwhile. Readers opt into the snapshot
//! explicitly when the backend is unreachable.

use std::sync::atomic::{AtomicU64, Ordering};

use bounce_core::check::CheckRecord;
use bounce_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::slot::JsonSlot;

/// The record list as last confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub taken_at: Timestamp,
    pub records: Vec<CheckRecord>,
}

/// Invalidation counter observed before a list was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Holds at most one [`Snapshot`], optionally mirrored to a [`JsonSlot`] so
/// it survives restarts. Slot failures are logged, never surfaced.
pub struct SnapshotCache {
    current: RwLock<Option<Snapshot>>,
    generation: AtomicU64,
    slot: Option<JsonSlot>,
}

impl SnapshotCache {
    pub fn in_memory() -> Self {
        Self {
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
            slot: None,
        }
    }

    /// Open a persisted cache, loading whatever the slot holds.
    pub async fn persistent(slot: JsonSlot) -> Self {
        let initial = match slot.load::<Snapshot>().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, path = %slot.path().display(), "Ignoring unreadable snapshot slot");
                None
            }
        };
        Self {
            current: RwLock::new(initial),
            generation: AtomicU64::new(0),
            slot: Some(slot),
        }
    }

    /// Take before fetching the list that will be passed to
    /// [`remember`](Self::remember).
    pub fn generation(&self) -> Generation {
        Generation(self.generation.load(Ordering::SeqCst))
    }

    /// Replace the snapshot with a record set listed at `seen`.
    ///
    /// Does nothing if the cache was invalidated since `seen`. Returns
    /// whether the snapshot was stored.
    pub async fn remember(&self, seen: Generation, records: &[CheckRecord]) -> bool {
        let mut current = self.current.write().await;
        if self.generation() != seen {
            tracing::debug!("Discarding list fetched before a write");
            return false;
        }
        let snapshot = Snapshot {
            taken_at: chrono::Utc::now(),
            records: records.to_vec(),
        };
        if let Some(slot) = &self.slot {
            if let Err(e) = slot.save(&snapshot).await {
                tracing::warn!(error = %e, "Failed to persist snapshot");
            }
        }
        *current = Some(snapshot);
        true
    }

    /// Drop the snapshot after a confirmed write.
    pub async fn invalidate(&self) {
        let mut current = self.current.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        let had_snapshot = current.take().is_some();
        if let Some(slot) = &self.slot {
            if let Err(e) = slot.clear().await {
                tracing::warn!(error = %e, "Failed to clear snapshot slot");
            }
        }
        drop(current);
        if had_snapshot {
            tracing::debug!("Snapshot invalidated");
        }
    }

    pub async fn current(&self) -> Option<Snapshot> {
        self.current.read().await.clone()
    }
}
