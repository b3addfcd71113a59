//! Session document database operations
//!
//! Get/put accessors for the `session_documents` table. Values are stored as
//! JSON text and replaced wholesale on every write.

use async_trait::async_trait;
use chrono::Utc;
use lingua_common::{Error, Result};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::session::{Document, DocumentStore};

/// SQLite-backed [`DocumentStore`]
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn load(&self, session_id: &str, document: Document) -> Result<Option<Value>> {
        get_document(&self.pool, session_id, document).await
    }

    async fn save(&self, session_id: &str, document: Document, value: &Value) -> Result<()> {
        set_document(&self.pool, session_id, document, value).await
    }
}

/// Read one stored document
pub async fn get_document(db: &SqlitePool, session_id: &str, document: Document) -> Result<Option<Value>> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT value FROM session_documents WHERE session_id = ? AND document = ?",
    )
    .bind(session_id)
    .bind(document.as_str())
    .fetch_optional(db)
    .await
    .map_err(Error::Database)?;

    match row {
        Some((value,)) => Ok(Some(serde_json::from_str(&value)?)),
        None => Ok(None),
    }
}

/// Insert or replace one stored document
pub async fn set_document(db: &SqlitePool, session_id: &str, document: Document, value: &Value) -> Result<()> {
    sqlx::query(
        "INSERT INTO session_documents (session_id, document, value, updated_at) VALUES (?, ?, ?, ?)
         ON CONFLICT(session_id, document) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(session_id)
    .bind(document.as_str())
    .bind(value.to_string())
    .bind(Utc::now().to_rfc3339())
    .execute(db)
    .await
    .map_err(Error::Database)?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
