//! In-memory [`CardStore`] for tests and embedding.
//!
//! Cards live in a `BTreeMap` behind `std::sync::RwLock`. Ids are assigned
//! from a monotonically increasing counter starting at 1, so deleted ids are
//! never reused.
//!
//! The store can simulate failures: [`InMemoryCardStore::mark_unreadable`]
//! makes single reads fail, and [`InMemoryCardStore::set_available`] takes
//! the whole store offline.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Card, CardId};

use super::CardStore;

struct Inner {
    cards: BTreeMap<CardId, Card>,
    next_id: i64,
    unreadable: BTreeSet<CardId>,
}

/// In-memory card collection.
pub struct InMemoryCardStore {
    inner: RwLock<Inner>,
    available: AtomicBool,
}

impl InMemoryCardStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                cards: BTreeMap::new(),
                next_id: 1,
                unreadable: BTreeSet::new(),
            }),
            available: AtomicBool::new(true),
        }
    }

    /// Make every subsequent [`get_by_id`](CardStore::get_by_id) for `id` fail
    /// with [`StoreError::FetchFailed`].
    pub fn mark_unreadable(&self, id: CardId) {
        if let Ok(mut inner) = self.inner.write() {
            inner.unreadable.insert(id);
        }
    }

    /// Undo [`mark_unreadable`](Self::mark_unreadable).
    pub fn mark_readable(&self, id: CardId) {
        if let Ok(mut inner) = self.inner.write() {
            inner.unreadable.remove(&id);
        }
    }

    /// While unavailable, every operation fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of cards currently stored.
    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.cards.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".into()))
        }
    }
}

impl Default for InMemoryCardStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("in-memory store lock poisoned".into())
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    async fn list_all_ids(&self) -> Result<BTreeSet<CardId>, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.cards.keys().copied().collect())
    }

    async fn get_by_id(&self, id: CardId) -> Result<Card, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().map_err(poisoned)?;
        if inner.unreadable.contains(&id) {
            return Err(StoreError::FetchFailed {
                id,
                reason: "card marked unreadable".into(),
            });
        }
        inner.cards.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn create_card(
        &self,
        topic: &str,
        front: &str,
        back: &str,
    ) -> Result<CardId, StoreError> {
        self.check_available()?;
        let mut inner = self.inner.write().map_err(poisoned)?;
        let id = CardId(inner.next_id);
        inner.next_id += 1;
        inner.cards.insert(
            id,
            Card {
                id,
                topic: topic.to_string(),
                front: front.to_string(),
                back: back.to_string(),
            },
        );
        Ok(id)
    }

    async fn delete_card(&self, id: CardId) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut inner = self.inner.write().map_err(poisoned)?;
        Ok(inner.cards.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store = InMemoryCardStore::new();
        let a = store.create_card("t", "q1", "a1").await.unwrap();
        let b = store.create_card("t", "q2", "a2").await.unwrap();
        assert!(b > a);

        store.delete_card(b).await.unwrap();
        let c = store.create_card("t", "q3", "a3").await.unwrap();
        assert!(c > b, "deleted ids must not be reused");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = InMemoryCardStore::new();
        let err = store.get_by_id(CardId(99)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(CardId(99))));
    }

    #[tokio::test]
    async fn test_unreadable_and_offline() {
        let store = InMemoryCardStore::new();
        let id = store.create_card("t", "q", "a").await.unwrap();

        store.mark_unreadable(id);
        let err = store.get_by_id(id).await.unwrap_err();
        assert!(!err.is_fatal());
        store.mark_readable(id);
        assert_eq!(store.get_by_id(id).await.unwrap().front, "q");

        store.set_available(false);
        assert!(store.list_all_ids().await.unwrap_err().is_fatal());
        assert!(store.create_card("t", "q", "a").await.unwrap_err().is_fatal());
        store.set_available(true);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let store = InMemoryCardStore::new();
        let id = store.create_card("t", "q", "a").await.unwrap();
        assert!(store.delete_card(id).await.unwrap());
        assert!(!store.delete_card(id).await.unwrap());
        assert!(store.is_empty());
    }
}
