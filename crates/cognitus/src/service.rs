//! The service object that owns the collection and the index.
//!
//! Every read and write goes through [`Cognitus`], which keeps both handles
//! behind one async mutex. That gives a single writer: a sync pass, an
//! admission, and a removal never interleave, and within an admission the
//! collection create finishes before the index insert starts.
//!
//! Classification and admission are refused with [`Error::NotSynced`] until
//! the first [`sync`](Cognitus::sync) has committed.
//!
//! Candidate generation happens outside the service. Callers generate
//! first and then admit each candidate, so a slow LLM request never blocks
//! the stores.

use anyhow::Context;
use serde::Serialize;
use tokio::sync::Mutex;

use cognitus_core::admission::{self, Admission};
use cognitus_core::classify::{Classification, DuplicateClassifier};
use cognitus_core::error::{Error, Result};
use cognitus_core::index::CardIndex;
use cognitus_core::models::{CandidateCard, CardId};
use cognitus_core::normalize::card_body;
use cognitus_core::parse::GeneratedCard;
use cognitus_core::reconcile::{self, SyncPlan, SyncProgressReporter, SyncReport};
use cognitus_core::store::CardStore;

use crate::config::Config;
use crate::sqlite_index::SqliteCardIndex;
use crate::sqlite_store::{SqliteCardStore, TopicCount};

struct Inner<S, I> {
    store: S,
    index: I,
    synced: bool,
}

/// Serializes all access to one collection and its index.
pub struct Cognitus<S, I> {
    inner: Mutex<Inner<S, I>>,
    classifier: DuplicateClassifier,
}

/// How far the index has drifted from the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexHealth {
    pub collection: usize,
    pub indexed: usize,
    /// Cards with no index entry.
    pub missing: usize,
    /// Index entries whose card is gone.
    pub stale: usize,
}

/// The production pairing: SQLite collection and SQLite FTS5 index.
pub type SqliteCognitus = Cognitus<SqliteCardStore, SqliteCardIndex>;

impl<S: CardStore, I: CardIndex> Cognitus<S, I> {
    pub fn new(store: S, index: I, classifier: DuplicateClassifier) -> Self {
        Self {
            inner: Mutex::new(Inner {
                store,
                index,
                synced: false,
            }),
            classifier,
        }
    }

    pub fn classifier(&self) -> &DuplicateClassifier {
        &self.classifier
    }

    pub async fn is_synced(&self) -> bool {
        self.inner.lock().await.synced
    }

    /// Bring the index in line with the collection.
    ///
    /// A failed pass leaves the synced flag as it was.
    pub async fn sync(&self, progress: &dyn SyncProgressReporter) -> Result<SyncReport> {
        let mut inner = self.inner.lock().await;
        let report = reconcile::sync(&inner.store, &inner.index, progress).await?;
        inner.synced = true;
        Ok(report)
    }

    /// Classify a candidate without writing anything.
    pub async fn classify(&self, front: &str, back: &str) -> Result<Classification> {
        let inner = self.inner.lock().await;
        if !inner.synced {
            return Err(Error::NotSynced);
        }
        let body = card_body(front, back);
        Ok(self.classifier.classify(&inner.index, &body).await?)
    }

    /// Admit one candidate card.
    pub async fn admit(&self, topic: &str, front: &str, back: &str) -> Result<Admission> {
        let inner = self.inner.lock().await;
        if !inner.synced {
            return Err(Error::NotSynced);
        }
        let candidate = CandidateCard::new(topic, front, back);
        admission::admit(&inner.store, &inner.index, &self.classifier, &candidate).await
    }

    /// Admit each generated card in order, taking the lock once per card.
    pub async fn admit_all(&self, topic: &str, cards: &[GeneratedCard]) -> Result<Vec<Admission>> {
        let mut results = Vec::with_capacity(cards.len());
        for card in cards {
            results.push(self.admit(topic, &card.front, &card.back).await?);
        }
        Ok(results)
    }

    /// Delete a card from the collection and drop its index entry.
    ///
    /// Returns `false` if the collection had no such card. A failed index
    /// delete is logged and left for the next sync.
    pub async fn remove(&self, id: CardId) -> Result<bool> {
        let inner = self.inner.lock().await;
        let existed = inner.store.delete_card(id).await?;

        if let Err(e) = inner.index.delete_by_id(id).await {
            tracing::warn!(id = %id, error = %e, "index delete failed; next sync will remove it");
        } else if existed {
            tracing::info!(id = %id, "card removed");
        }

        Ok(existed)
    }

    /// Compare the collection and index id sets without changing either.
    pub async fn health(&self) -> Result<IndexHealth> {
        let inner = self.inner.lock().await;
        let collection = inner.store.list_all_ids().await?;
        let indexed = inner.index.list_ids().await?;
        let plan = SyncPlan::compute(&collection, &indexed);

        Ok(IndexHealth {
            collection: collection.len(),
            indexed: indexed.len(),
            missing: plan.to_insert.len(),
            stale: plan.to_delete.len(),
        })
    }
}

impl SqliteCognitus {
    /// Open the collection and index named in `config`.
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let store = SqliteCardStore::open(&config.collection.path)
            .await
            .with_context(|| {
                format!(
                    "Failed to open collection: {}",
                    config.collection.path.display()
                )
            })?;
        let index = SqliteCardIndex::open(&config.index.path)
            .await
            .with_context(|| format!("Failed to open index: {}", config.index.path.display()))?;

        Ok(Self::new(
            store,
            index,
            DuplicateClassifier::new(config.dedup.threshold),
        ))
    }

    /// Card counts per topic in the collection.
    pub async fn topic_counts(&self) -> Result<Vec<TopicCount>> {
        let inner = self.inner.lock().await;
        Ok(inner.store.topic_counts().await?)
    }

    pub async fn close(&self) {
        let inner = self.inner.lock().await;
        inner.store.close().await;
        inner.index.close().await;
    }
}
