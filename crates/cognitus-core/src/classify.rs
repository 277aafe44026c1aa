//! Duplicate classification of candidate bodies.
//!
//! The classifier asks the index for its single nearest entry and scores it
//! with [`similarity::ratio`](crate::similarity::ratio). Only the top match
//! is considered; no top-k re-ranking happens here.
//!
//! | Nearest match | Score | Result |
//! |---------------|-------|--------|
//! | none | - | [`Classification::Novel`] |
//! | some | `< threshold` | [`Classification::Novel`] |
//! | some | `>= threshold` | [`Classification::Duplicate`] |

use serde::Serialize;

use crate::error::IndexError;
use crate::index::CardIndex;
use crate::models::CardId;
use crate::similarity::ratio;

/// Similarity at or above which a candidate counts as a duplicate.
pub const DEFAULT_THRESHOLD: u8 = 90;

/// Verdict for one candidate body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Classification {
    Duplicate { matched_id: CardId, score: u8 },
    Novel,
}

impl Classification {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Classification::Duplicate { .. })
    }
}

/// Applies the similarity threshold to the index's nearest match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateClassifier {
    threshold: u8,
}

impl DuplicateClassifier {
    /// `threshold` is clamped to `0..=100`.
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold: threshold.min(100),
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Classify an already-normalized body against `index`.
    pub async fn classify(
        &self,
        index: &dyn CardIndex,
        body: &str,
    ) -> Result<Classification, IndexError> {
        let Some(nearest) = index.find_nearest(body).await? else {
            tracing::debug!(body, "no index match");
            return Ok(Classification::Novel);
        };

        let score = ratio(body, &nearest.body);
        tracing::debug!(body, matched_id = %nearest.id, score, "nearest index match");

        if score >= self.threshold {
            Ok(Classification::Duplicate {
                matched_id: nearest.id,
                score,
            })
        } else {
            Ok(Classification::Novel)
        }
    }
}

impl Default for DuplicateClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
