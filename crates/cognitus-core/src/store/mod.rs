//! External card collection abstraction.
//!
//! The [`CardStore`] trait is the boundary to the authoritative flashcard
//! collection. The collection assigns card ids; the core never edits a
//! card, it only lists, reads, creates, and deletes them.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Card, CardId};

/// Authoritative flashcard collection.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list_all_ids`](CardStore::list_all_ids) | Every card id currently in the collection |
/// | [`get_by_id`](CardStore::get_by_id) | Read one card |
/// | [`create_card`](CardStore::create_card) | Add a card; the store picks the id |
/// | [`delete_card`](CardStore::delete_card) | Remove a card |
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn list_all_ids(&self) -> Result<BTreeSet<CardId>, StoreError>;

    /// Read one card. A missing id is [`StoreError::NotFound`].
    async fn get_by_id(&self, id: CardId) -> Result<Card, StoreError>;

    /// Create a card and return the id the store assigned to it.
    async fn create_card(&self, topic: &str, front: &str, back: &str)
        -> Result<CardId, StoreError>;

    /// Delete a card. Returns `false` if no card had that id.
    async fn delete_card(&self, id: CardId) -> Result<bool, StoreError>;
}
