//! Flashcard generation through OpenRouter.
//!
//! [`generate_cards`] sends the flashcard prompt for a topic to the
//! configured chat-completions endpoint and parses the reply with
//! [`parse_cards`]. Nothing here touches the collection or the index; the
//! caller admits the returned candidates one by one afterwards.
//!
//! The API key is read from `OPENROUTER_API_KEY` on every call. A failed
//! request is returned as-is (no retry).

use anyhow::{bail, Result};
use std::time::Duration;

use cognitus_core::parse::{parse_cards, GeneratedCard};

use crate::config::GenerationConfig;

/// Environment variable holding the OpenRouter API key.
pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";

const PROMPT_TEMPLATE: &str = "\
Generate a large set of concise, atomic flashcards on {topic}.

The format should be:
Question? (A single, specific question or concept)
:::
Answer. (A brief, clear explanation or answer)

Create as many flashcards as possible, covering:
- Key terms and definitions
- Core principles
- Important facts
- Cause-and-effect relationships
- Distinguishing features between related concepts
- Historical basis
- Critiques
- Common misconceptions

Ensure each flashcard focuses on a single, discrete piece of information.
Avoid enumerated answers, and flashcards like \"what is the main X\",
\"what is the most common\", etc.
For math equations, use the format: <anki-mathjax>equation</anki-mathjax>.
Wrap code in italics <i>code</i>
Your response MUST only contain flashcards.
";

/// The generation prompt for `topic`.
pub fn build_prompt(topic: &str) -> String {
    PROMPT_TEMPLATE.replace("{topic}", topic.trim())
}

/// Request raw flashcard text for `topic`.
///
/// # Errors
///
/// Fails when generation is disabled, the API key is unset, the request
/// fails or times out, the endpoint answers with a non-2xx status, or the
/// response carries no completion text.
pub async fn generate_text(config: &GenerationConfig, topic: &str) -> Result<String> {
    match config.provider.as_str() {
        "openrouter" => {}
        "disabled" => bail!("Generation provider is disabled"),
        other => bail!("Unknown generation provider: {}", other),
    }

    let api_key =
        std::env::var(API_KEY_VAR).map_err(|_| anyhow::anyhow!("{} not set", API_KEY_VAR))?;

    let model = config
        .model
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("generation.model required"))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let body = serde_json::json!({
        "model": model,
        "messages": [
            { "role": "user", "content": build_prompt(topic) }
        ],
    });

    tracing::info!(topic, model = %model, "requesting flashcards");

    let response = client
        .post(config.endpoint.as_str())
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response.text().await.unwrap_or_default();
        bail!("OpenRouter API error {}: {}", status, body_text);
    }

    let json: serde_json::Value = response.json().await?;
    parse_completion(&json)
}

/// Generate and parse candidate cards for `topic`.
pub async fn generate_cards(config: &GenerationConfig, topic: &str) -> Result<Vec<GeneratedCard>> {
    let raw = generate_text(config, topic).await?;
    let cards = parse_cards(&raw);
    tracing::info!(topic, cards = cards.len(), "flashcards generated");
    Ok(cards)
}

/// Extract the completion text from a chat or legacy completion response.
///
/// Reads `choices[0].message.content`, falling back to `choices[0].text`.
pub fn parse_completion(json: &serde_json::Value) -> Result<String> {
    if let Some(message) = json.get("error").and_then(|e| e.get("message")) {
        bail!("OpenRouter returned an error: {}", message);
    }

    let choice = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| anyhow::anyhow!("Invalid completion response: missing choices"))?;

    choice
        .get("message")
        .and_then(|m| m.get("content"))
        .or_else(|| choice.get("text"))
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid completion response: no text in first choice"))
}
