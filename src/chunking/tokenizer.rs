//! Token counting against the semantic strategy's token budget.
//!
//! Counts are policy knobs, not protocol constants: any counter works as long
//! as one session uses the same scheme throughout. The default is tiktoken's
//! cl100k vocabulary when the `tiktoken` feature is on, with a whitespace
//! heuristic as the always-available fallback.

use std::sync::Arc;

/// Measures text size in model-specific token units.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

pub type SharedCounter = Arc<dyn TokenCounter>;

/// Rough estimate: one token per whitespace-delimited word.
///
/// Deterministic and tokenizer-independent, which is what tests want when
/// they parameterize the threshold.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicCounter;

impl TokenCounter for HeuristicCounter {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/// Exact counts from tiktoken's cl100k vocabulary.
#[cfg(feature = "tiktoken")]
pub struct TiktokenCounter {
    bpe: tiktoken_rs::CoreBPE,
}

#[cfg(feature = "tiktoken")]
impl TiktokenCounter {
    pub fn new() -> Result<Self, TokenizerError> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|err| TokenizerError::VocabularyLoad(err.to_string()))?;
        Ok(Self { bpe })
    }
}

#[cfg(feature = "tiktoken")]
impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenizerError {
    #[error("failed to load tokenizer vocabulary: {0}")]
    VocabularyLoad(String),
}

/// The best counter the build allows: tiktoken when available, otherwise the
/// heuristic.
pub fn default_counter() -> SharedCounter {
    #[cfg(feature = "tiktoken")]
    {
        match TiktokenCounter::new() {
            Ok(counter) => return Arc::new(counter),
            Err(err) => {
                tracing::warn!(error = %err, "falling back to heuristic token counting");
            }
        }
    }
    Arc::new(HeuristicCounter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_counts_words() {
        assert_eq!(HeuristicCounter.count("one two three."), 3);
        assert_eq!(HeuristicCounter.count(""), 0);
        assert_eq!(HeuristicCounter.count("   "), 0);
    }

    #[cfg(feature = "tiktoken")]
    #[test]
    fn tiktoken_counts_are_nonzero_for_text() {
        let counter = TiktokenCounter::new().unwrap();
        assert!(counter.count("Hello world.") > 0);
        assert_eq!(counter.count(""), 0);
    }
}
