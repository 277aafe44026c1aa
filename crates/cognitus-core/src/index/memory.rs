//! In-memory [`CardIndex`] for tests and small collections.
//!
//! Entries are kept in a `BTreeMap` behind `std::sync::RwLock`. Lookup is a
//! brute-force scan: an entry matches when it shares at least one search
//! term with the query, and entries are ranked by
//!
//! 1. number of distinct shared terms (more is better),
//! 2. number of terms in the entry (fewer is better),
//! 3. id (lower wins), so ties resolve deterministically.
//!
//! An `apply` holds the write lock for the whole batch, so batches are
//! atomic with respect to readers.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::IndexError;
use crate::models::{CardId, IndexEntry};

use super::{search_terms, CardIndex, IndexBatch};

/// In-memory similarity index.
pub struct InMemoryCardIndex {
    entries: RwLock<BTreeMap<CardId, String>>,
}

impl InMemoryCardIndex {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Body currently stored for `id`.
    pub fn body(&self, id: CardId) -> Option<String> {
        self.entries.read().ok()?.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryCardIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> IndexError {
    IndexError::Backend("in-memory index lock poisoned".into())
}

#[async_trait]
impl CardIndex for InMemoryCardIndex {
    async fn apply(&self, batch: &IndexBatch) -> Result<(), IndexError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        for id in &batch.deletes {
            entries.remove(id);
        }
        for entry in &batch.inserts {
            entries.insert(entry.id, entry.body.clone());
        }
        Ok(())
    }

    async fn list_ids(&self) -> Result<BTreeSet<CardId>, IndexError> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.keys().copied().collect())
    }

    async fn find_nearest(&self, body: &str) -> Result<Option<IndexEntry>, IndexError> {
        let query = search_terms(body);
        if query.is_empty() {
            return Ok(None);
        }

        let entries = self.entries.read().map_err(poisoned)?;
        let best = entries
            .iter()
            .filter_map(|(id, stored)| {
                let terms = search_terms(stored);
                let shared = query
                    .iter()
                    .filter(|q| terms.binary_search(*q).is_ok())
                    .count();
                (shared > 0).then(|| (shared, terms.len(), *id, stored))
            })
            .min_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

        Ok(best.map(|(_, _, id, stored)| IndexEntry::new(id, stored.clone())))
    }
}
