//! Full-diff reconciliation of the index against the collection.
//!
//! A sync pass lists every id on both sides, computes a [`SyncPlan`], and
//! drives the index into agreement:
//!
//! ```text
//! to_delete = indexed − collection
//! to_insert = collection − indexed
//! ```
//!
//! # Commit Points
//!
//! 1. All deletes are applied in one batch and committed.
//! 2. Each card in `to_insert` is fetched and normalized. A card that cannot
//!    be read ([`StoreError::NotFound`](crate::error::StoreError::NotFound) or
//!    [`StoreError::FetchFailed`](crate::error::StoreError::FetchFailed)) is
//!    skipped and reported; the next pass retries it.
//! 3. All fetched entries are applied in one batch and committed.
//!
//! If the collection becomes unavailable during step 2, the pass stops and
//! returns the error. Deletes from step 1 stay committed; no inserts from
//! the aborted pass are written.
//!
//! Re-running a pass with no collection changes is a no-op.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::index::{CardIndex, IndexBatch};
use crate::models::{CardId, IndexEntry};
use crate::store::CardStore;

/// The id-level difference between the collection and the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub to_delete: BTreeSet<CardId>,
    pub to_insert: BTreeSet<CardId>,
}

impl SyncPlan {
    /// Compute the plan from the two id sets.
    ///
    /// `to_delete` and `to_insert` are disjoint by construction: an id in
    /// `to_delete` is absent from `collection`, every id in `to_insert` is
    /// present in it.
    pub fn compute(collection: &BTreeSet<CardId>, indexed: &BTreeSet<CardId>) -> Self {
        Self {
            to_delete: indexed.difference(collection).copied().collect(),
            to_insert: collection.difference(indexed).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_insert.is_empty()
    }
}

/// Outcome of one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SyncReport {
    /// Cards in the collection when the pass started.
    pub collection_size: usize,
    pub deleted: usize,
    pub inserted: usize,
    /// Ids whose fetch failed; left for the next pass.
    pub skipped: Vec<CardId>,
}

/// Progress events emitted while a sync pass runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncProgressEvent {
    Planned { to_delete: usize, to_insert: usize },
    Fetching { n: usize, total: usize },
    Committed { deleted: usize, inserted: usize },
}

/// Receives [`SyncProgressEvent`]s. Implementations decide where they go.
pub trait SyncProgressReporter: Send + Sync {
    fn report(&self, event: SyncProgressEvent);
}

/// Reporter that drops every event.
pub struct NoProgress;

impl SyncProgressReporter for NoProgress {
    fn report(&self, _event: SyncProgressEvent) {}
}

/// Run one full-diff sync pass.
///
/// # Errors
///
/// - [`StoreError::Unavailable`](crate::error::StoreError::Unavailable) while listing or fetching aborts the pass.
/// - Any index failure aborts the pass.
///
/// Per-card fetch failures are not errors; they appear in
/// [`SyncReport::skipped`].
pub async fn sync(
    store: &dyn CardStore,
    index: &dyn CardIndex,
    progress: &dyn SyncProgressReporter,
) -> Result<SyncReport> {
    let collection = store.list_all_ids().await?;
    let indexed = index.list_ids().await?;
    let plan = SyncPlan::compute(&collection, &indexed);

    tracing::debug!(
        collection = collection.len(),
        indexed = indexed.len(),
        to_delete = plan.to_delete.len(),
        to_insert = plan.to_insert.len(),
        "sync plan computed"
    );
    progress.report(SyncProgressEvent::Planned {
        to_delete: plan.to_delete.len(),
        to_insert: plan.to_insert.len(),
    });

    let mut report = SyncReport {
        collection_size: collection.len(),
        ..SyncReport::default()
    };

    if !plan.to_delete.is_empty() {
        index
            .apply(&IndexBatch::deletes(plan.to_delete.iter().copied()))
            .await?;
        report.deleted = plan.to_delete.len();
    }

    let total = plan.to_insert.len();
    let mut entries = Vec::with_capacity(total);
    for (n, id) in plan.to_insert.iter().copied().enumerate() {
        match store.get_by_id(id).await {
            Ok(card) => entries.push(IndexEntry::from_card(&card)),
            Err(e) if e.is_fatal() => {
                tracing::error!(
                    error = %e,
                    deleted = report.deleted,
                    remaining = total - n,
                    "collection became unavailable during sync; inserts aborted"
                );
                return Err(e.into());
            }
            Err(e) => {
                tracing::warn!(card_id = %id, error = %e, "skipping card, will retry next sync");
                report.skipped.push(id);
            }
        }
        progress.report(SyncProgressEvent::Fetching { n: n + 1, total });
    }

    if !entries.is_empty() {
        report.inserted = entries.len();
        index.apply(&IndexBatch::inserts(entries)).await?;
    }

    progress.report(SyncProgressEvent::Committed {
        deleted: report.deleted,
        inserted: report.inserted,
    });
    tracing::info!(
        collection = report.collection_size,
        deleted = report.deleted,
        inserted = report.inserted,
        skipped = report.skipped.len(),
        "sync complete"
    );

    Ok(report)
}
