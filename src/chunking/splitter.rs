//! Sentence splitting for the greedy block-packing pass.
//!
//! A boundary is a run of terminal punctuation followed by whitespace. This
//! is deliberately the same class of heuristic the sentence segmenter uses;
//! any reasonable splitter satisfies the contract, and this one keeps every
//! non-whitespace character of its input.

use regex::Regex;
use std::sync::OnceLock;

fn boundary() -> &'static Regex {
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    BOUNDARY.get_or_init(|| Regex::new(r"[.!?]+\s+").expect("sentence boundary pattern"))
}

/// Split `text` into trimmed sentence-level pieces.
///
/// Text with no boundary comes back as a single piece; whitespace-only input
/// yields nothing.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut last = 0;

    for found in boundary().find_iter(text) {
        let piece = text[last..found.end()].trim();
        if !piece.is_empty() {
            sentences.push(piece.to_string());
        }
        last = found.end();
    }

    let tail = text[last..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}
