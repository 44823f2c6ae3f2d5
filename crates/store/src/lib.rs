//! Record store adapters for bounced checks.
//!
//! [`RecordStore`] is the uniform CRUD contract. Three adapters implement it:
//!
//! - [`ScriptStore`]: a spreadsheet script behind one POST endpoint.
//! - [`DocumentStore`]: a JSONB document collection in PostgreSQL.
//! - [`LocalCacheStore`]: a JSON file slot, used when nothing else is
//!   configured.
//!
//! Every adapter returns normalized [`CheckRecord`]s whose `id` is a string,
//! whatever the backend keys records by. [`SnapshotCache`] holds the
//! last-known-good list for callers that opt into stale reads.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bounce_core::check::{CheckFields, CheckPatch, CheckRecord};
use serde::Serialize;

pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod local;
pub mod normalize;
pub mod script;
pub mod slot;

pub use cache::{Generation, Snapshot, SnapshotCache};
pub use config::{StoreConfig, StoreTarget};
pub use document::DocumentStore;
pub use error::{StoreError, StoreErrorKind};
pub use local::LocalCacheStore;
pub use script::ScriptStore;
pub use slot::JsonSlot;

/// Which backend an adapter talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Script,
    Document,
    Local,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Script => "script",
            BackendKind::Document => "document",
            BackendKind::Local => "local",
        })
    }
}

/// Uniform create/read/update/delete contract over a pluggable backend.
///
/// Mutations return only after the backend confirmed them. Identifiers are
/// matched by string equality of the normalized id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// All records. An empty store yields an empty vector, not an error.
    async fn list(&self) -> Result<Vec<CheckRecord>, StoreError>;

    async fn get(&self, id: &str) -> Result<CheckRecord, StoreError>;

    /// Store a new record; the backend assigns its identifier.
    async fn create(&self, fields: &CheckFields) -> Result<CheckRecord, StoreError>;

    /// Apply the present fields of `patch` and return the stored result.
    async fn update(&self, id: &str, patch: &CheckPatch) -> Result<CheckRecord, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Reachability probe.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Build the adapter selected by `config`.
///
/// Only configuration errors fail here. An unreachable backend is reported
/// by the adapter's own calls; the document store tries its migrations now
/// and again on the first call that reaches the database.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn RecordStore>, StoreError> {
    let store: Arc<dyn RecordStore> = match &config.target {
        StoreTarget::Script { url } => {
            Arc::new(ScriptStore::new(url.clone(), config.script_timeout)?)
        }
        StoreTarget::Document { url } => {
            let store =
                DocumentStore::connect_lazy(url, config.max_connections, config.db_acquire_timeout)?;
            if let Err(e) = store.ensure_migrated().await {
                tracing::warn!(error = %e, "Document store migrations deferred");
            }
            Arc::new(store)
        }
        StoreTarget::Local { path } => Arc::new(LocalCacheStore::new(path.clone())),
    };
    tracing::info!(backend = %store.kind(), "Record store ready");
    Ok(store)
}
