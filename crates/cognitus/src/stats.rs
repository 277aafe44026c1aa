//! Collection and index overview.
//!
//! `cognitus status` prints how many cards the collection holds, how many
//! the index mirrors, and how far the two have drifted. It does not sync,
//! so the drift it reports is what the next sync will repair.

use anyhow::Result;
use serde::Serialize;

use crate::config::Config;
use crate::service::{IndexHealth, SqliteCognitus};
use crate::sqlite_store::TopicCount;

#[derive(Debug, Serialize)]
pub struct Status {
    pub threshold: u8,
    pub collection_bytes: u64,
    pub index_bytes: u64,
    pub health: IndexHealth,
    pub topics: Vec<TopicCount>,
}

pub async fn collect_status(config: &Config) -> Result<Status> {
    let service = SqliteCognitus::open(config).await?;
    let health = service.health().await?;
    let topics = service.topic_counts().await?;
    service.close().await;

    Ok(Status {
        threshold: service.classifier().threshold(),
        collection_bytes: file_size(&config.collection.path),
        index_bytes: file_size(&config.index.path),
        health,
        topics,
    })
}

fn file_size(path: &std::path::Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Run the status command and print a summary (or JSON with `json`).
pub async fn run_status(config: &Config, json: bool) -> Result<()> {
    let status = collect_status(config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Cognitus Status");
    println!("===============");
    println!();
    println!(
        "  Collection:  {} ({})",
        config.collection.path.display(),
        format_bytes(status.collection_bytes)
    );
    println!(
        "  Index:       {} ({})",
        config.index.path.display(),
        format_bytes(status.index_bytes)
    );
    println!("  Threshold:   {}", status.threshold);
    println!();
    println!("  Cards:       {}", status.health.collection);
    println!("  Indexed:     {}", status.health.indexed);
    println!("  Missing:     {}", status.health.missing);
    println!("  Stale:       {}", status.health.stale);

    if !status.topics.is_empty() {
        println!();
        println!("  By topic:");
        println!("  {:<32} {:>6}", "TOPIC", "CARDS");
        println!("  {}", "-".repeat(40));
        for t in &status.topics {
            println!("  {:<32} {:>6}", t.topic, t.cards);
        }
    }

    println!();
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
