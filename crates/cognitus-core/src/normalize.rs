//! Text normalization for similarity comparison.
//!
//! Every body that reaches the index, and every candidate body compared
//! against it, passes through [`normalize_text`] so both sides are in the
//! same canonical form.
//!
//! # Rules
//!
//! - ASCII letters, ASCII digits, and the space character are kept.
//! - Everything else (punctuation, tabs, newlines, non-ASCII) is dropped.
//! - Case and spacing are left untouched.
//!
//! ```rust
//! use cognitus_core::normalize::normalize_text;
//!
//! assert_eq!(normalize_text("Hello, World! 123"), "Hello World 123");
//! ```

/// Strip every character that is not an ASCII alphanumeric or a space.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect()
}

/// Normalized body of a card: `normalize(front + " " + back)`.
pub fn card_body(front: &str, back: &str) -> String {
    normalize_text(&format!("{} {}", front, back))
}
