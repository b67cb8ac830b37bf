//! Token-budgeted semantic strategy.

use async_trait::async_trait;

use super::Segmenter;
use crate::chunking::classifier::SharedClassifier;
use crate::chunking::tokenizer::SharedCounter;
use crate::chunking::{segment_topics, split_sentences};
use crate::unit::Unit;

/// Accumulates fragments until the buffer reaches a token budget, then packs
/// its sentences into budget-sized blocks and runs each block through the
/// topic classifier.
///
/// Two pieces of state persist across fragments:
///
/// * `buffer`: raw text not yet handed to the classifier. The leftover
///   partial block of a sub-segmentation pass is carried back here and is
///   not re-segmented until it grows past the budget again.
/// * `accumulator`: classified non-shift text awaiting emission. It drains
///   as one unit whenever a topic shift arrives, and once more at flush.
///
/// Classification failures never surface; the affected block passes through
/// intact as a single continuation (see
/// [`segment_topics`](crate::chunking::segment_topics)).
pub struct SemanticSegmenter {
    buffer: String,
    accumulator: String,
    token_limit: usize,
    classifier: SharedClassifier,
    counter: SharedCounter,
}

impl SemanticSegmenter {
    pub fn new(classifier: SharedClassifier, counter: SharedCounter, token_limit: usize) -> Self {
        Self {
            buffer: String::new(),
            accumulator: String::new(),
            token_limit: token_limit.max(1),
            classifier,
            counter,
        }
    }

    /// Classify one block and apply the emission policy: continuations feed
    /// the accumulator; a shift first drains the accumulator as a unit, then
    /// emits itself tagged as a topic shift.
    async fn classify_block(&mut self, block: &str, units: &mut Vec<Unit>) {
        for segment in segment_topics(self.classifier.as_ref(), block).await {
            if segment.topic_shift {
                if !self.accumulator.trim().is_empty() {
                    units.push(Unit::text(std::mem::take(&mut self.accumulator)));
                } else {
                    self.accumulator.clear();
                }
                units.push(Unit::topic_shift(segment.text));
            } else {
                if !self.accumulator.is_empty() {
                    self.accumulator.push(' ');
                }
                self.accumulator.push_str(segment.text.trim());
            }
        }
    }

    /// The sub-segmentation pass: greedily pack sentences into blocks that
    /// stay within the budget, classifying each block that fills up. The
    /// trailing partial block becomes the new buffer.
    async fn sub_segment(&mut self) -> Vec<Unit> {
        let text = std::mem::take(&mut self.buffer);
        tracing::debug!(
            tokens = self.counter.count(&text),
            limit = self.token_limit,
            "running sub-segmentation pass"
        );

        let mut units = Vec::new();
        let mut block = String::new();

        for sentence in split_sentences(&text) {
            let tentative = if block.is_empty() {
                sentence.clone()
            } else {
                format!("{block} {sentence}")
            };

            if self.counter.count(&tentative) > self.token_limit {
                if block.is_empty() {
                    // A single sentence over the budget goes through alone.
                    self.classify_block(&sentence, &mut units).await;
                } else {
                    self.classify_block(&block, &mut units).await;
                    block = sentence;
                }
            } else {
                block = tentative;
            }
        }

        // Carried over, not discarded; re-segmented only once it grows past
        // the budget again.
        self.buffer = block;
        units
    }
}

#[async_trait]
impl Segmenter for SemanticSegmenter {
    async fn consume(&mut self, fragment: &str) -> Vec<Unit> {
        if fragment.is_empty() {
            return Vec::new();
        }
        self.buffer.push_str(fragment);

        if self.counter.count(&self.buffer) >= self.token_limit {
            self.sub_segment().await
        } else {
            Vec::new()
        }
    }

    async fn flush(&mut self) -> Vec<Unit> {
        let mut units = Vec::new();

        if !self.buffer.trim().is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            self.classify_block(&rest, &mut units).await;
        } else {
            self.buffer.clear();
        }

        if !self.accumulator.trim().is_empty() {
            units.push(Unit::text(std::mem::take(&mut self.accumulator)));
        } else {
            self.accumulator.clear();
        }

        units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::classifier::{ClassifyError, TopicClassifier};
    use crate::chunking::tokenizer::HeuristicCounter;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Replays canned marked-entry responses and records the blocks it saw.
    struct StubClassifier {
        responses: Mutex<VecDeque<Vec<String>>>,
        blocks: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl StubClassifier {
        fn new(responses: Vec<Vec<&str>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| r.into_iter().map(String::from).collect())
                        .collect(),
                ),
                blocks: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn blocks(&self) -> Vec<String> {
            self.blocks.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TopicClassifier for StubClassifier {
        async fn classify(&self, block: &str) -> Result<Vec<String>, ClassifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.blocks.lock().unwrap().push(block.to_string());
            let mut responses = self.responses.lock().unwrap();
            responses
                .pop_front()
                .ok_or(ClassifyError::MissingContent)
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl TopicClassifier for FailingClassifier {
        async fn classify(&self, _block: &str) -> Result<Vec<String>, ClassifyError> {
            Err(ClassifyError::MissingContent)
        }
    }

    fn segmenter_with(classifier: Arc<dyn TopicClassifier>, limit: usize) -> SemanticSegmenter {
        SemanticSegmenter::new(classifier, Arc::new(HeuristicCounter), limit)
    }

    #[tokio::test]
    async fn pass_triggers_on_the_crossing_fragment() {
        let stub = StubClassifier::new(vec![vec!["one two three four five six seven eight."]]);
        let mut segmenter = segmenter_with(stub.clone(), 10);

        // Below the budget: nothing happens.
        assert!(segmenter
            .consume("one two three four five six seven eight.")
            .await
            .is_empty());
        assert_eq!(stub.calls(), 0);

        // This fragment crosses the budget, so the pass runs now. The first
        // sentence fills a block; adding the second would exceed the limit,
        // so the first is classified and the second is carried over.
        segmenter.consume(" nine ten eleven.").await;
        assert_eq!(stub.calls(), 1);
        assert_eq!(
            stub.blocks(),
            vec!["one two three four five six seven eight.".to_string()]
        );
        assert_eq!(segmenter.buffer, "nine ten eleven.");

        // The carried-over remainder is not re-segmented below the budget.
        assert!(segmenter.consume(" tiny.").await.is_empty());
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn shift_drains_accumulator_then_emits_tagged_unit() {
        let stub = StubClassifier::new(vec![vec![
            "The intro sentence.",
            "[TOPIC SHIFT] A brand new topic.",
            "More of the new topic.",
        ]]);
        let mut segmenter = segmenter_with(stub.clone(), 6);

        // Two sentences totalling 8 words: the pass classifies the first and
        // carries the second.
        let units = segmenter
            .consume("alpha beta gamma delta. epsilon zeta eta theta.")
            .await;
        let rendered: Vec<(bool, &str)> = units
            .iter()
            .map(|u| (u.topic_shift, u.text.as_str()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                (false, "The intro sentence."),
                (true, "A brand new topic."),
            ]
        );

        // "More of the new topic." is still in the accumulator; the carried
        // sentence falls back to a single block at flush (stub is exhausted).
        let flushed = segmenter.flush().await;
        assert_eq!(flushed.len(), 1);
        assert!(!flushed[0].topic_shift);
        assert_eq!(
            flushed[0].text,
            "More of the new topic. epsilon zeta eta theta."
        );
    }

    #[tokio::test]
    async fn classification_failure_keeps_block_verbatim() {
        let mut segmenter = segmenter_with(Arc::new(FailingClassifier), 8);
        let text = "one two three four five. six seven eight nine ten.";

        assert!(segmenter.consume(text).await.len() <= 1);
        let mut all = segmenter.flush().await;
        // Everything comes back as non-shift text with no loss.
        let combined = all
            .drain(..)
            .map(|u| {
                assert!(!u.topic_shift);
                u.text
            })
            .collect::<Vec<_>>()
            .join(" ");
        let words = |s: &str| s.split_whitespace().map(str::to_string).collect::<Vec<_>>();
        assert_eq!(words(&combined), words(text));
    }

    #[tokio::test]
    async fn oversized_single_sentence_is_classified_alone() {
        let stub = StubClassifier::new(vec![
            vec!["a b c d e f."],
            vec!["short tail."],
        ]);
        let mut segmenter = segmenter_with(stub.clone(), 4);

        segmenter.consume("a b c d e f. short tail.").await;
        assert_eq!(stub.blocks()[0], "a b c d e f.");

        segmenter.flush().await;
        assert_eq!(stub.blocks()[1], "short tail.");
    }

    #[tokio::test]
    async fn flush_is_idempotent() {
        let mut segmenter = segmenter_with(Arc::new(FailingClassifier), 50);
        segmenter.consume("a few words").await;
        assert!(!segmenter.flush().await.is_empty());
        assert!(segmenter.flush().await.is_empty());
    }

    #[tokio::test]
    async fn flush_classifies_below_threshold_buffer() {
        let stub = StubClassifier::new(vec![vec!["tiny."]]);
        let mut segmenter = segmenter_with(stub.clone(), 100);
        segmenter.consume("tiny.").await;
        assert_eq!(stub.calls(), 0);

        let units = segmenter.flush().await;
        assert_eq!(stub.calls(), 1);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "tiny.");
    }
}
