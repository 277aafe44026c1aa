//! Local similarity index abstraction.
//!
//! The [`CardIndex`] trait is the local, derived projection of the
//! collection: one [`IndexEntry`] per synced card. It never decides what
//! exists; the [`reconcile`](crate::reconcile) pass makes it agree with the
//! [`CardStore`](crate::store::CardStore).
//!
//! Writes go through [`CardIndex::apply`], which commits an [`IndexBatch`]
//! atomically: either every delete and insert in the batch is visible
//! afterwards, or none is. Single-row helpers are thin wrappers over it.

pub mod memory;

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::IndexError;
use crate::models::{CardId, IndexEntry};

/// A set of index writes committed together.
#[derive(Debug, Clone, Default)]
pub struct IndexBatch {
    /// Ids to remove. Absent ids are ignored.
    pub deletes: Vec<CardId>,
    /// Entries to upsert, replacing any existing entry with the same id.
    pub inserts: Vec<IndexEntry>,
}

impl IndexBatch {
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.inserts.is_empty()
    }

    pub fn deletes(ids: impl IntoIterator<Item = CardId>) -> Self {
        Self {
            deletes: ids.into_iter().collect(),
            inserts: Vec::new(),
        }
    }

    pub fn inserts(entries: Vec<IndexEntry>) -> Self {
        Self {
            deletes: Vec::new(),
            inserts: entries,
        }
    }
}

/// Full-text searchable mapping from card id to normalized body.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`apply`](CardIndex::apply) | Commit a batch of deletes and upserts atomically |
/// | [`insert`](CardIndex::insert) | Upsert one entry |
/// | [`delete_by_id`](CardIndex::delete_by_id) | Remove one entry (no-op if absent) |
/// | [`list_ids`](CardIndex::list_ids) | Every indexed id |
/// | [`find_nearest`](CardIndex::find_nearest) | Single best match for a body |
#[async_trait]
pub trait CardIndex: Send + Sync {
    async fn apply(&self, batch: &IndexBatch) -> Result<(), IndexError>;

    async fn list_ids(&self) -> Result<BTreeSet<CardId>, IndexError>;

    /// The top-ranked entry for `body`, or `None` when nothing matches.
    ///
    /// Ranking belongs to the implementation; callers only get the winner.
    async fn find_nearest(&self, body: &str) -> Result<Option<IndexEntry>, IndexError>;

    async fn insert(&self, entry: &IndexEntry) -> Result<(), IndexError> {
        self.apply(&IndexBatch::inserts(vec![entry.clone()])).await
    }

    async fn delete_by_id(&self, id: CardId) -> Result<(), IndexError> {
        self.apply(&IndexBatch::deletes([id])).await
    }
}

/// Split a normalized body into lowercase search terms.
///
/// Shared by index implementations so that every backend sees the same
/// terms for the same body.
pub fn search_terms(body: &str) -> Vec<String> {
    let mut terms: Vec<String> = body
        .split_whitespace()
        .map(|t| t.to_ascii_lowercase())
        .collect();
    terms.sort();
    terms.dedup();
    terms
}
