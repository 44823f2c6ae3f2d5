//! Document store adapter over a PostgreSQL JSONB collection.
//!
//! The pool connects lazily, so an unreachable database surfaces as
//! `Unavailable` on each call instead of failing startup. Migrations run
//! once, on the first call that reaches the database.

mod identity;
mod repo;

pub use identity::{native_id_to_string, parse_native_id};
pub use repo::{CheckDocument, CheckDocumentRepo};

use std::time::Duration;

use async_trait::async_trait;
use bounce_core::check::{CheckFields, CheckPatch, CheckRecord};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;

use crate::error::StoreError;
use crate::normalize::record_from_value;
use crate::{BackendKind, RecordStore};

/// Record store backed by the `check_documents` table.
pub struct DocumentStore {
    pool: PgPool,
    migrated: OnceCell<()>,
}

impl DocumentStore {
    /// Build a lazily connecting pool. Only a malformed URL fails here.
    pub fn connect_lazy(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(url)?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            migrated: OnceCell::new(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations unless a previous call already did.
    /// A failed attempt is retried on the next call.
    pub async fn ensure_migrated(&self) -> Result<(), StoreError> {
        self.migrated
            .get_or_try_init(|| async {
                sqlx::migrate!("../../db/migrations").run(&self.pool).await?;
                tracing::info!("Document store migrations applied");
                Ok::<(), StoreError>(())
            })
            .await?;
        Ok(())
    }

    /// The pool, once the schema is known to be current.
    async fn ready(&self) -> Result<&PgPool, StoreError> {
        self.ensure_migrated().await?;
        Ok(&self.pool)
    }
}

/// Attach the application id to a stored document and normalize it.
fn into_record(row: CheckDocument) -> Result<CheckRecord, StoreError> {
    let mut doc = match row.doc {
        Value::Object(doc) => doc,
        other => {
            return Err(StoreError::Corrupt(format!(
                "document {} is not an object: {other}",
                row.id
            )))
        }
    };
    doc.insert("id".into(), Value::String(native_id_to_string(row.id)));
    record_from_value(Value::Object(doc))
}

/// Serialize a payload as a document body, never carrying an `id` key.
fn document_body<T: serde::Serialize>(value: &T) -> Result<Value, StoreError> {
    let mut body = serde_json::to_value(value)?;
    if let Value::Object(map) = &mut body {
        map.remove("id");
    }
    Ok(body)
}

#[async_trait]
impl RecordStore for DocumentStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Document
    }

    async fn list(&self) -> Result<Vec<CheckRecord>, StoreError> {
        CheckDocumentRepo::list(self.ready().await?)
            .await?
            .into_iter()
            .map(into_record)
            .collect()
    }

    async fn get(&self, id: &str) -> Result<CheckRecord, StoreError> {
        let native = parse_native_id(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let row = CheckDocumentRepo::find_by_id(self.ready().await?, native)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        into_record(row)
    }

    async fn create(&self, fields: &CheckFields) -> Result<CheckRecord, StoreError> {
        let row = CheckDocumentRepo::insert(self.ready().await?, &document_body(fields)?).await?;
        tracing::debug!(native_id = row.id, "Check document inserted");
        into_record(row)
    }

    async fn update(&self, id: &str, patch: &CheckPatch) -> Result<CheckRecord, StoreError> {
        let native = parse_native_id(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let row = CheckDocumentRepo::merge(self.ready().await?, native, &document_body(patch)?)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        into_record(row)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let native = parse_native_id(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if CheckDocumentRepo::delete(self.ready().await?, native).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound(id.to_string()))
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        CheckDocumentRepo::ping(&self.pool).await?;
        self.ensure_migrated().await
    }
}
