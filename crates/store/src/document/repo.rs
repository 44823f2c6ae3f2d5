//! Queries against the `check_documents` table.

use serde_json::Value;
use sqlx::PgPool;

/// Column list shared across queries.
const COLUMNS: &str = "id, doc";

/// A raw row: native key plus the JSONB document (without `id`).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CheckDocument {
    pub id: i64,
    pub doc: Value,
}

/// Provides CRUD operations for check documents.
pub struct CheckDocumentRepo;

impl CheckDocumentRepo {
    pub async fn insert(pool: &PgPool, doc: &Value) -> Result<CheckDocument, sqlx::Error> {
        let query = format!("INSERT INTO check_documents (doc) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, CheckDocument>(&query)
            .bind(doc)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<CheckDocument>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM check_documents WHERE id = $1");
        sqlx::query_as::<_, CheckDocument>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All documents in insertion order.
    pub async fn list(pool: &PgPool) -> Result<Vec<CheckDocument>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM check_documents ORDER BY id");
        sqlx::query_as::<_, CheckDocument>(&query)
            .fetch_all(pool)
            .await
    }

    /// Shallow-merge `patch` into the stored document.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn merge(
        pool: &PgPool,
        id: i64,
        patch: &Value,
    ) -> Result<Option<CheckDocument>, sqlx::Error> {
        let query = format!(
            "UPDATE check_documents SET doc = doc || $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CheckDocument>(&query)
            .bind(id)
            .bind(patch)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM check_documents WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
    }
}
