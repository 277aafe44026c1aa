//! CLI commands that drive the service.
//!
//! Each command opens the SQLite collection and index, runs a sync pass,
//! and then does its one job. Output goes to stdout; progress and logs go
//! to stderr (or the log file).

use anyhow::{bail, Context, Result};
use std::path::Path;

use cognitus_core::admission::Admission;
use cognitus_core::classify::Classification;
use cognitus_core::models::CardId;
use cognitus_core::parse::{parse_cards, GeneratedCard};
use cognitus_core::reconcile::SyncProgressReporter;

use crate::config::Config;
use crate::generate::generate_cards;
use crate::progress::ProgressMode;
use crate::service::SqliteCognitus;

async fn open_synced(config: &Config, progress: &dyn SyncProgressReporter) -> Result<SqliteCognitus> {
    let service = SqliteCognitus::open(config).await?;
    let report = service.sync(progress).await?;
    tracing::info!(
        collection = report.collection_size,
        deleted = report.deleted,
        inserted = report.inserted,
        skipped = report.skipped.len(),
        "sync complete"
    );
    Ok(service)
}

/// `cognitus sync`
pub async fn run_sync(config: &Config, mode: ProgressMode) -> Result<()> {
    let reporter = mode.reporter();
    let service = SqliteCognitus::open(config).await?;
    let report = service.sync(reporter.as_ref()).await?;
    service.close().await;

    println!(
        "Sync complete: {} inserted, {} deleted, {} skipped (collection: {} cards)",
        report.inserted,
        report.deleted,
        report.skipped.len(),
        report.collection_size
    );
    if !report.skipped.is_empty() {
        let ids: Vec<String> = report.skipped.iter().map(|id| id.to_string()).collect();
        println!("Skipped (retried next sync): {}", ids.join(", "));
    }
    Ok(())
}

/// `cognitus check`
pub async fn run_check(config: &Config, front: &str, back: &str) -> Result<()> {
    let service = open_synced(config, ProgressMode::default_for_tty().reporter().as_ref()).await?;
    let verdict = service.classify(front, back).await?;
    service.close().await;

    match verdict {
        Classification::Duplicate { matched_id, score } => {
            println!("duplicate of card {} (score {})", matched_id, score)
        }
        Classification::Novel => println!("novel"),
    }
    Ok(())
}

fn print_admission(admission: &Admission, card: &GeneratedCard) {
    match admission {
        Admission::Admitted { id, indexed: true } => {
            println!("admitted card {}: {}", id, card.front)
        }
        Admission::Admitted { id, indexed: false } => {
            println!("admitted card {} (index entry pending): {}", id, card.front)
        }
        Admission::Rejected { matched_id, score } => println!(
            "rejected: matches card {} (score {}): {}",
            matched_id, score, card.front
        ),
    }
}

/// `cognitus admit`
pub async fn run_admit(config: &Config, topic: &str, front: &str, back: &str) -> Result<()> {
    if front.trim().is_empty() || back.trim().is_empty() {
        bail!("front and back must not be empty");
    }

    let service = open_synced(config, ProgressMode::default_for_tty().reporter().as_ref()).await?;
    let admission = service.admit(topic, front, back).await?;
    service.close().await;

    let card = GeneratedCard {
        front: front.to_string(),
        back: back.to_string(),
    };
    print_admission(&admission, &card);
    Ok(())
}

async fn admit_and_report(service: &SqliteCognitus, topic: &str, cards: &[GeneratedCard]) -> Result<()> {
    let admissions = service.admit_all(topic, cards).await?;
    for (admission, card) in admissions.iter().zip(cards) {
        print_admission(admission, card);
    }

    let admitted = admissions.iter().filter(|a| a.is_admitted()).count();
    println!(
        "Admitted {} of {} cards ({} rejected as duplicates)",
        admitted,
        cards.len(),
        cards.len() - admitted
    );
    Ok(())
}

/// `cognitus import`
pub async fn run_import(config: &Config, file: &Path, topic: &str) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let cards = parse_cards(&raw);
    if cards.is_empty() {
        println!("No cards found in {}", file.display());
        return Ok(());
    }

    let service = open_synced(config, ProgressMode::default_for_tty().reporter().as_ref()).await?;
    let result = admit_and_report(&service, topic, &cards).await;
    service.close().await;
    result
}

/// `cognitus generate`
pub async fn run_generate(config: &Config, topic: &str, save: bool) -> Result<()> {
    if !config.generation.is_enabled() {
        bail!("Generation is disabled. Set [generation] provider = \"openrouter\" in the config.");
    }

    if !save {
        let cards = generate_cards(&config.generation, topic).await?;
        for card in &cards {
            println!("{}\n:::\n{}\n", card.front, card.back);
        }
        println!("Generated {} cards (not saved)", cards.len());
        return Ok(());
    }

    let service = open_synced(config, ProgressMode::default_for_tty().reporter().as_ref()).await?;
    let result = match generate_cards(&config.generation, topic).await {
        Ok(cards) => admit_and_report(&service, topic, &cards).await,
        Err(e) => Err(e),
    };
    service.close().await;
    result
}

/// `cognitus remove`
pub async fn run_remove(config: &Config, id: i64) -> Result<()> {
    let service = open_synced(config, ProgressMode::default_for_tty().reporter().as_ref()).await?;
    let removed = service.remove(CardId(id)).await?;
    service.close().await;

    if !removed {
        bail!("card {} not found in the collection", id);
    }
    println!("removed card {}", id);
    Ok(())
}
