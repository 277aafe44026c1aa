//! # Cognitus
//!
//! Generate flashcards with an LLM and keep only the ones the collection
//! does not already have.
//!
//! Cognitus mirrors every card of an external collection into a local
//! full-text index, scores each new candidate against its nearest indexed
//! card, and admits it only when the similarity stays below the threshold.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐  sync   ┌────────────┐
//! │ Collection │───────▶│ FTS5 index │
//! │  (SQLite)  │         │  (SQLite)  │
//! └─────▲──────┘         └─────┬──────┘
//!       │ create               │ nearest
//!       │      ┌───────────────▼──┐       ┌────────────┐
//!       └──────│ Cognitus service │◀──────│ OpenRouter │
//!              └───────┬──────────┘       └────────────┘
//!                      │
//!              ┌───────┴───────┐
//!              ▼               ▼
//!         ┌─────────┐    ┌──────────┐
//!         │   CLI   │    │   HTTP   │
//!         └─────────┘    └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! cognitus init
//! cognitus sync
//! cognitus generate "cell biology" --save
//! cognitus check --front "What is DNA?" --back "Genetic material"
//! cognitus serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | SQLite connections |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_index`] | FTS5 similarity index |
//! | [`sqlite_store`] | Card collection |
//! | [`service`] | Single-writer service over both stores |
//! | [`generate`] | OpenRouter flashcard generation |
//! | [`commands`] | CLI command implementations |
//! | [`server`] | HTTP review API |
//! | [`stats`] | Collection and index overview |
//! | [`progress`] | Sync progress on stderr |
//! | [`logging`] | Log subscriber setup |

pub mod commands;
pub mod config;
pub mod db;
pub mod generate;
pub mod logging;
pub mod migrate;
pub mod progress;
pub mod server;
pub mod service;
pub mod sqlite_index;
pub mod sqlite_store;
pub mod stats;
