//! Parser for generated flashcard text.
//!
//! A generation response lists cards as a question line, a line holding
//! only `:::`, and an answer line:
//!
//! ```text
//! What is the powerhouse of the cell?
//! :::
//! The mitochondria.
//! ```
//!
//! Anything that does not fit this shape (preambles, blank separators,
//! dangling delimiters, empty questions or answers) is skipped silently.
//! Lines consumed by one card are never reused by the next.

use serde::{Deserialize, Serialize};

/// Delimiter line between a question and its answer.
pub const DELIMITER: &str = ":::";

/// A question/answer pair parsed from a generation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCard {
    pub front: String,
    pub back: String,
}

/// Extract every well-formed card from `raw`, in order.
///
/// ```rust
/// use cognitus_core::parse::parse_cards;
///
/// let cards = parse_cards("Intro text\nWhat is 2+2?\n:::\n4\n");
/// assert_eq!(cards.len(), 1);
/// assert_eq!(cards[0].front, "What is 2+2?");
/// ```
pub fn parse_cards(raw: &str) -> Vec<GeneratedCard> {
    let lines: Vec<&str> = raw.lines().collect();
    let mut cards = Vec::new();
    let mut i = 0;

    while i + 2 < lines.len() {
        let (front, delim, back) = (lines[i].trim(), lines[i + 1], lines[i + 2].trim());
        if delim == DELIMITER && is_text(front) && is_text(back) {
            cards.push(GeneratedCard {
                front: front.to_string(),
                back: back.to_string(),
            });
            i += 3;
        } else {
            i += 1;
        }
    }

    cards
}

fn is_text(line: &str) -> bool {
    !line.is_empty() && line != DELIMITER
}
