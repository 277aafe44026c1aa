//! # Cognitus Core
//!
//! Duplicate detection and index synchronization for Cognitus: card
//! models, text normalization, similarity scoring, the collection and index
//! traits, reconciliation, classification, and admission.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or other
//! native-only dependencies. Storage backends live in the `cognitus` crate
//! and plug in through [`store::CardStore`] and [`index::CardIndex`].
//!
//! ## Data Flow
//!
//! ```text
//! collection ──▶ reconcile::sync ──▶ index          (once, at startup)
//! candidate  ──▶ classify ◀── index
//!            ──▶ admission::admit ──▶ collection, then index
//! ```

pub mod admission;
pub mod classify;
pub mod error;
pub mod index;
pub mod models;
pub mod normalize;
pub mod parse;
pub mod reconcile;
pub mod similarity;
pub mod store;

pub use admission::Admission;
pub use classify::{Classification, DuplicateClassifier};
pub use error::{Error, IndexError, StoreError};
pub use models::{CandidateCard, Card, CardId, IndexEntry};
