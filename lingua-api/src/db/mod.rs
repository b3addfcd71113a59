//! Database access for lingua-api
//!
//! Session documents live in a single SQLite table keyed by
//! `(session_id, document)`.

pub mod documents;

pub use documents::SqliteDocumentStore;

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

/// Initialize database connection pool
///
/// Creates the database file (and its parent directory) when missing.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url)
        .await
        .context("Failed to open session database")?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory pool, used by tests and `--in-memory` runs
///
/// Each SQLite `:memory:` connection is its own database, so the pool must
/// never open a second one.
pub async fn init_memory_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect("sqlite::memory:")
        .await
        .context("Failed to open in-memory database")?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create lingua-api tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS session_documents (
            session_id TEXT NOT NULL,
            document TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (session_id, document)
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create session_documents table")?;

    tracing::info!("Database tables initialized (session_documents)");

    Ok(())
}
