//! Database schema migrations (idempotent).
//!
//! | File | Table | Purpose |
//! |------|-------|---------|
//! | index | `cards_fts` (FTS5) | `id UNINDEXED, body`; rowid mirrors the card id |
//! | collection | `cards` | `id, topic, front, back, created_at` |
//!
//! Each store runs its own migration when it opens, so a missing file is
//! created on first use. `cognitus init` runs both up front.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Create the FTS5 index table if it does not exist.
pub async fn migrate_index(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // FTS5 CREATE is not idempotent natively, so we check first
    let fts_exists: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='cards_fts'",
    )
    .fetch_one(pool)
    .await?;

    if !fts_exists {
        sqlx::query(
            r#"
            CREATE VIRTUAL TABLE cards_fts USING fts5(
                id UNINDEXED,
                body
            )
            "#,
        )
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Create the card collection table if it does not exist.
pub async fn migrate_collection(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // AUTOINCREMENT keeps ids of deleted cards from being handed out again.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            topic TEXT NOT NULL,
            front TEXT NOT NULL,
            back TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cards_topic ON cards(topic)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create both databases and their schemas.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let index = db::connect(&config.index.path)
        .await
        .with_context(|| format!("Failed to open index: {}", config.index.path.display()))?;
    migrate_index(&index).await?;
    index.close().await;

    let collection = db::connect(&config.collection.path).await.with_context(|| {
        format!(
            "Failed to open collection: {}",
            config.collection.path.display()
        )
    })?;
    migrate_collection(&collection).await?;
    collection.close().await;

    Ok(())
}
