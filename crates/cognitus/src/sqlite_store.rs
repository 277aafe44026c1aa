//! SQLite-backed [`CardStore`] implementation.
//!
//! The collection file holds the authoritative `cards` table. Ids come from
//! `INTEGER PRIMARY KEY AUTOINCREMENT`, so the collection (not the caller)
//! assigns them and a deleted id is never reused.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use cognitus_core::error::StoreError;
use cognitus_core::models::{Card, CardId};
use cognitus_core::store::CardStore;

use crate::db::{self, SQLITE_BUSY, SQLITE_LOCKED};
use crate::migrate;

/// SQLite implementation of the [`CardStore`] trait.
pub struct SqliteCardStore {
    pool: SqlitePool,
}

/// Number of cards filed under one topic.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub cards: i64,
}

impl SqliteCardStore {
    /// Open (or create) the collection at `path`.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let pool = db::connect(path).await.map_err(store_error)?;
        migrate::migrate_collection(&pool)
            .await
            .map_err(store_error)?;
        tracing::debug!(path = %path.display(), "collection opened");
        Ok(Self { pool })
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[allow(dead_code)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM cards")
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)
    }

    /// Card counts per topic, largest first.
    pub async fn topic_counts(&self) -> Result<Vec<TopicCount>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT topic, COUNT(*) AS cards
            FROM cards
            GROUP BY topic
            ORDER BY cards DESC, topic ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter()
            .map(|r| {
                Ok(TopicCount {
                    topic: r.try_get("topic").map_err(store_error)?,
                    cards: r.try_get("cards").map_err(store_error)?,
                })
            })
            .collect()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Any failure that is not about a single row means the collection itself
/// cannot be used right now.
fn store_error(err: sqlx::Error) -> StoreError {
    match db::sqlite_code(&err) {
        Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => {
            StoreError::Unavailable(format!("collection is locked: {}", err))
        }
        _ => StoreError::Unavailable(err.to_string()),
    }
}

#[async_trait]
impl CardStore for SqliteCardStore {
    async fn list_all_ids(&self) -> Result<BTreeSet<CardId>, StoreError> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM cards")
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(ids.into_iter().map(CardId).collect())
    }

    async fn get_by_id(&self, id: CardId) -> Result<Card, StoreError> {
        let row = sqlx::query("SELECT id, topic, front, back FROM cards WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?
            .ok_or(StoreError::NotFound(id))?;

        let decode = |e: sqlx::Error| StoreError::FetchFailed {
            id,
            reason: e.to_string(),
        };

        Ok(Card {
            id,
            topic: row.try_get("topic").map_err(decode)?,
            front: row.try_get("front").map_err(decode)?,
            back: row.try_get("back").map_err(decode)?,
        })
    }

    async fn create_card(
        &self,
        topic: &str,
        front: &str,
        back: &str,
    ) -> Result<CardId, StoreError> {
        let now = chrono::Utc::now().timestamp();
        let result =
            sqlx::query("INSERT INTO cards (topic, front, back, created_at) VALUES (?, ?, ?, ?)")
                .bind(topic)
                .bind(front)
                .bind(back)
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(store_error)?;

        Ok(CardId(result.last_insert_rowid()))
    }

    async fn delete_card(&self, id: CardId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM cards WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }
}
