//! Topic classification and the supporting text utilities used by the
//! token-budgeted semantic strategy.
//!
//! * [`classifier`]: the `TopicClassifier` seam, marker parsing, and the
//!   OpenAI-backed implementation with its never-fail fallback.
//! * [`splitter`]: regex sentence splitting for greedy block packing.
//! * [`tokenizer`]: pluggable token counting against the token budget.

pub mod classifier;
pub mod splitter;
pub mod tokenizer;

pub use classifier::{
    segment_topics, ClassifyError, OpenAiClassifier, TopicClassifier, TopicSegment,
    TOPIC_SHIFT_MARKER,
};
pub use splitter::split_sentences;
pub use tokenizer::{default_counter, HeuristicCounter, TokenCounter};

#[cfg(feature = "tiktoken")]
pub use tokenizer::TiktokenCounter;
