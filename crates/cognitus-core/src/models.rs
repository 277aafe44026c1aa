//! Core data models used throughout Cognitus.
//!
//! A [`Card`] lives in the external collection and is authoritative. An
//! [`IndexEntry`] is the local, derived projection of a card used for
//! similarity lookup. A [`CandidateCard`] is a freshly generated card that
//! has not been admitted yet.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize::card_body;

/// Identifier assigned to a card by the external collection.
///
/// Opaque to the core: it is only compared, stored, and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub i64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CardId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A flashcard record owned by the external collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub topic: String,
    pub front: String,
    pub back: String,
}

/// Local projection of a [`Card`]'s normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    /// Id of the mirrored card.
    pub id: CardId,
    /// `normalize(front + " " + back)`.
    pub body: String,
}

impl IndexEntry {
    pub fn new(id: CardId, body: impl Into<String>) -> Self {
        Self {
            id,
            body: body.into(),
        }
    }

    /// Build the entry that mirrors `card`.
    pub fn from_card(card: &Card) -> Self {
        Self {
            id: card.id,
            body: card_body(&card.front, &card.back),
        }
    }
}

/// A generated card waiting for admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCard {
    pub topic: String,
    pub front: String,
    pub back: String,
}

impl CandidateCard {
    pub fn new(
        topic: impl Into<String>,
        front: impl Into<String>,
        back: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            front: front.into(),
            back: back.into(),
        }
    }

    /// The normalized body compared against the index.
    pub fn body(&self) -> String {
        card_body(&self.front, &self.back)
    }
}
