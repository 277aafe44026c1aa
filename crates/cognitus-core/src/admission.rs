//! Admission pipeline for candidate cards.
//!
//! One call to [`admit`] handles one candidate:
//!
//! 1. Normalize `front + " " + back`.
//! 2. Classify the body against the index.
//! 3. On a duplicate: log it and return [`Admission::Rejected`]. Nothing is
//!    written.
//! 4. On a novel card: create it in the collection, then insert its index
//!    entry under the id the collection assigned.
//!
//! If step 4's index insert fails, the card already exists in the
//! collection. That is reported as `indexed: false` instead of an error;
//! the next sync pass adds the missing entry.

use serde::Serialize;

use crate::classify::{Classification, DuplicateClassifier};
use crate::error::Result;
use crate::index::CardIndex;
use crate::models::{CandidateCard, CardId, IndexEntry};
use crate::store::CardStore;

/// Outcome of admitting one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Admission {
    /// A new card was created under `id`.
    Admitted {
        id: CardId,
        /// Whether the index entry was written too.
        indexed: bool,
    },
    /// The candidate matched an existing card and was discarded.
    Rejected { matched_id: CardId, score: u8 },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }
}

/// Classify `candidate` and, if novel, write it to the collection and index.
///
/// # Errors
///
/// Index failures during classification and collection failures during the
/// create are returned. An index failure after the create is not.
pub async fn admit(
    store: &dyn CardStore,
    index: &dyn CardIndex,
    classifier: &DuplicateClassifier,
    candidate: &CandidateCard,
) -> Result<Admission> {
    let body = candidate.body();

    if let Classification::Duplicate { matched_id, score } =
        classifier.classify(index, &body).await?
    {
        tracing::info!(
            matched_id = %matched_id,
            score,
            threshold = classifier.threshold(),
            candidate = %body,
            "similar card found, candidate rejected"
        );
        return Ok(Admission::Rejected { matched_id, score });
    }

    let id = store
        .create_card(&candidate.topic, &candidate.front, &candidate.back)
        .await?;

    let indexed = match index.insert(&IndexEntry::new(id, body.clone())).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                card_id = %id,
                error = %e,
                "card created but not indexed; next sync will add it"
            );
            false
        }
    };

    tracing::info!(card_id = %id, topic = %candidate.topic, body = %body, "new card inserted");
    Ok(Admission::Admitted { id, indexed })
}
