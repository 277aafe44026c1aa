//! Error taxonomy shared by the stores, the reconciler, and admission.
//!
//! | Error | Meaning | Handling |
//! |-------|---------|----------|
//! | [`StoreError::Unavailable`] | Collection unreachable or locked | Fatal for the operation |
//! | [`StoreError::NotFound`] / [`StoreError::FetchFailed`] | One card could not be read | Skipped during sync, retried next pass |
//! | [`IndexError::Corrupt`] | Index file unreadable | Fatal at startup |
//! | [`IndexError::Backend`] | Any other index failure | Fatal for the operation |
//! | [`Error::NotSynced`] | Admission before the first sync | Caller bug |
//!
//! A below-threshold match is never an error; it is simply a novel card.

use thiserror::Error;

use crate::models::CardId;

/// Failure reported by a [`CardStore`](crate::store::CardStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("card store unavailable: {0}")]
    Unavailable(String),

    #[error("card {0} not found in the collection")]
    NotFound(CardId),

    #[error("failed to fetch card {id}: {reason}")]
    FetchFailed { id: CardId, reason: String },
}

impl StoreError {
    /// Whether the failure affects the whole store rather than one card.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Failure reported by a [`CardIndex`](crate::index::CardIndex).
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index is corrupt or unreadable: {0}")]
    Corrupt(String),

    #[error("index operation failed: {0}")]
    Backend(String),
}

/// Top-level error for sync, classification, and admission.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("the index has not been synced with the collection yet")]
    NotSynced,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
