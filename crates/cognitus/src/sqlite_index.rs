//! SQLite FTS5-backed [`CardIndex`] implementation.
//!
//! Each entry is one row of the `cards_fts` virtual table. The row's
//! `rowid` is set to the card id, so an upsert is a delete-by-rowid followed
//! by an insert inside the same transaction.
//!
//! # Nearest-Match Query
//!
//! The body's search terms are quoted and OR-ed together and ranked by
//! FTS5's built-in BM25 `rank`:
//!
//! ```sql
//! SELECT id, body FROM cards_fts
//! WHERE cards_fts MATCH '"what" OR "is" OR "dna"'
//! ORDER BY rank, rowid LIMIT 1
//! ```
//!
//! A row that shares no term with the body is never returned. Quoting keeps
//! words like `AND`, `NOT`, or `NEAR` in a card from being read as FTS5
//! operators.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use cognitus_core::error::IndexError;
use cognitus_core::index::{search_terms, CardIndex, IndexBatch};
use cognitus_core::models::{CardId, IndexEntry};

use crate::db::{self, SQLITE_CORRUPT, SQLITE_NOTADB};
use crate::migrate;

/// SQLite implementation of the [`CardIndex`] trait.
pub struct SqliteCardIndex {
    pool: SqlitePool,
}

impl SqliteCardIndex {
    /// Open (or create) the index file at `path` and verify it is readable.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Corrupt`] when the file is not a database or
    /// fails an integrity check. An unreadable index is never replaced with
    /// an empty one.
    pub async fn open(path: &Path) -> Result<Self, IndexError> {
        let pool = db::connect(path).await.map_err(index_error)?;
        migrate::migrate_index(&pool).await.map_err(index_error)?;

        let index = Self { pool };
        index.check_integrity().await?;
        tracing::debug!(path = %path.display(), "index opened");
        Ok(index)
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[allow(dead_code)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run SQLite's `quick_check` and FTS5's `integrity-check`.
    pub async fn check_integrity(&self) -> Result<(), IndexError> {
        let status: String = sqlx::query_scalar("PRAGMA quick_check")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| IndexError::Corrupt(e.to_string()))?;
        if status != "ok" {
            return Err(IndexError::Corrupt(status));
        }

        sqlx::query("INSERT INTO cards_fts(cards_fts) VALUES('integrity-check')")
            .execute(&self.pool)
            .await
            .map_err(|e| IndexError::Corrupt(e.to_string()))?;

        Ok(())
    }

    pub async fn count(&self) -> Result<i64, IndexError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM cards_fts")
            .fetch_one(&self.pool)
            .await
            .map_err(index_error)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Map a sqlx error to the index error taxonomy.
fn index_error(err: sqlx::Error) -> IndexError {
    match db::sqlite_code(&err) {
        Some(SQLITE_CORRUPT) | Some(SQLITE_NOTADB) => IndexError::Corrupt(err.to_string()),
        _ => IndexError::Backend(err.to_string()),
    }
}

/// Build an FTS5 query that matches any of the body's terms.
fn match_query(body: &str) -> Option<String> {
    let terms = search_terms(body);
    if terms.is_empty() {
        return None;
    }
    Some(
        terms
            .iter()
            .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(" OR "),
    )
}

#[async_trait]
impl CardIndex for SqliteCardIndex {
    async fn apply(&self, batch: &IndexBatch) -> Result<(), IndexError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(index_error)?;

        for id in &batch.deletes {
            sqlx::query("DELETE FROM cards_fts WHERE rowid = ?")
                .bind(id.0)
                .execute(&mut *tx)
                .await
                .map_err(index_error)?;
        }

        for entry in &batch.inserts {
            sqlx::query("DELETE FROM cards_fts WHERE rowid = ?")
                .bind(entry.id.0)
                .execute(&mut *tx)
                .await
                .map_err(index_error)?;

            sqlx::query("INSERT INTO cards_fts (rowid, id, body) VALUES (?, ?, ?)")
                .bind(entry.id.0)
                .bind(entry.id.0)
                .bind(&entry.body)
                .execute(&mut *tx)
                .await
                .map_err(index_error)?;
        }

        tx.commit().await.map_err(index_error)?;
        Ok(())
    }

    async fn list_ids(&self) -> Result<BTreeSet<CardId>, IndexError> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT DISTINCT id FROM cards_fts")
            .fetch_all(&self.pool)
            .await
            .map_err(index_error)?;
        Ok(ids.into_iter().map(CardId).collect())
    }

    async fn find_nearest(&self, body: &str) -> Result<Option<IndexEntry>, IndexError> {
        let Some(query) = match_query(body) else {
            return Ok(None);
        };

        let row = sqlx::query(
            r#"
            SELECT id, body
            FROM cards_fts
            WHERE cards_fts MATCH ?
            ORDER BY rank, rowid
            LIMIT 1
            "#,
        )
        .bind(&query)
        .fetch_optional(&self.pool)
        .await
        .map_err(index_error)?;

        row.map(|r| {
            let id: i64 = r.try_get("id").map_err(index_error)?;
            let body: String = r.try_get("body").map_err(index_error)?;
            Ok(IndexEntry::new(CardId(id), body))
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_query_quotes_terms() {
        assert_eq!(
            match_query("What is DNA").as_deref(),
            Some("\"dna\" OR \"is\" OR \"what\"")
        );
        assert_eq!(
            match_query("NOT this AND that").as_deref(),
            Some("\"and\" OR \"not\" OR \"that\" OR \"this\"")
        );
        assert!(match_query("   ").is_none());
    }

    #[test]
    fn test_match_query_escapes_quotes() {
        assert_eq!(match_query("say \"hi\"").as_deref(), Some("\"\"\"hi\"\"\" OR \"say\""));
    }

    #[tokio::test]
    async fn test_open_rejects_garbage_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("index.sqlite");
        std::fs::write(&path, vec![0x42u8; 8192]).unwrap();

        let err = SqliteCardIndex::open(&path).await.err().unwrap();
        assert!(matches!(err, IndexError::Corrupt(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_upsert_and_lookup() {
        let tmp = tempfile::TempDir::new().unwrap();
        let index = SqliteCardIndex::open(&tmp.path().join("index.sqlite"))
            .await
            .unwrap();

        index.insert(&IndexEntry::new(CardId(1), "old body")).await.unwrap();
        index
            .insert(&IndexEntry::new(CardId(1), "What is DNA Genetic material"))
            .await
            .unwrap();
        index
            .insert(&IndexEntry::new(CardId(2), "Capital of France Paris"))
            .await
            .unwrap();

        assert_eq!(index.count().await.unwrap(), 2);
        let hit = index.find_nearest("what is dna").await.unwrap().unwrap();
        assert_eq!(hit, IndexEntry::new(CardId(1), "What is DNA Genetic material"));
        assert!(index.find_nearest("old").await.unwrap().is_none());
        assert!(index.find_nearest("quantum").await.unwrap().is_none());

        index.delete_by_id(CardId(1)).await.unwrap();
        index.delete_by_id(CardId(1)).await.unwrap();
        assert_eq!(index.list_ids().await.unwrap(), BTreeSet::from([CardId(2)]));
        index.close().await;
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("index.sqlite");

        let index = SqliteCardIndex::open(&path).await.unwrap();
        index
            .apply(&IndexBatch::inserts(vec![
                IndexEntry::new(CardId(10), "first card"),
                IndexEntry::new(CardId(11), "second card"),
            ]))
            .await
            .unwrap();
        index.close().await;

        let reopened = SqliteCardIndex::open(&path).await.unwrap();
        assert_eq!(
            reopened.list_ids().await.unwrap(),
            BTreeSet::from([CardId(10), CardId(11)])
        );
        reopened.close().await;
    }
}
