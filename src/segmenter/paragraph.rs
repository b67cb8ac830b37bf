//! Paragraph-boundary strategy.

use async_trait::async_trait;

use super::Segmenter;
use crate::unit::Unit;

/// Emits a unit for every complete paragraph (`\n\n`-delimited) in the buffer.
///
/// Splitting happens at the first `\n\n`, keeping the remainder, and repeats
/// until no boundary is left, so one fragment carrying several paragraph
/// breaks yields every complete paragraph, not just the first.
#[derive(Debug, Default)]
pub struct ParagraphSegmenter {
    buffer: String,
}

impl ParagraphSegmenter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Segmenter for ParagraphSegmenter {
    async fn consume(&mut self, fragment: &str) -> Vec<Unit> {
        if fragment.is_empty() {
            return Vec::new();
        }
        self.buffer.push_str(fragment);

        let mut units = Vec::new();
        while let Some(pos) = self.buffer.find("\n\n") {
            let rest = self.buffer.split_off(pos + 2);
            let paragraph = Unit::text(std::mem::replace(&mut self.buffer, rest));
            if !paragraph.is_empty() {
                units.push(paragraph);
            }
        }
        units
    }

    async fn flush(&mut self) -> Vec<Unit> {
        let rest = Unit::text(std::mem::take(&mut self.buffer));
        if rest.is_empty() {
            Vec::new()
        } else {
            vec![rest]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emits_every_paragraph_in_one_fragment() {
        let mut segmenter = ParagraphSegmenter::new();
        let units = segmenter
            .consume("First para.\n\nSecond para.\n\nThird")
            .await;
        let texts: Vec<&str> = units.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["First para.", "Second para."]);

        let flushed = segmenter.flush().await;
        assert_eq!(flushed.len(), 1);
        assert_eq!(flushed[0].text, "Third");
    }

    #[tokio::test]
    async fn boundary_split_across_fragments() {
        let mut segmenter = ParagraphSegmenter::new();
        assert!(segmenter.consume("One\n").await.is_empty());
        let units = segmenter.consume("\nTwo").await;
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "One");
    }

    #[tokio::test]
    async fn whitespace_only_paragraphs_are_skipped() {
        let mut segmenter = ParagraphSegmenter::new();
        let units = segmenter.consume("\n\n  \n\nReal text\n\n").await;
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "Real text");
    }

    #[tokio::test]
    async fn flush_is_idempotent() {
        let mut segmenter = ParagraphSegmenter::new();
        segmenter.consume("tail").await;
        assert_eq!(segmenter.flush().await.len(), 1);
        assert!(segmenter.flush().await.is_empty());
    }
}
