//! Fragment sources: the upstream side of a segmentation session.
//!
//! A [`FragmentSource`] yields an ordered, lazy sequence of text fragments
//! terminated by an explicit signal. Completion is a tagged [`StreamItem`]
//! rather than a sentinel value, so fragment text can never be mistaken for
//! end-of-stream.

use async_trait::async_trait;
use std::collections::VecDeque;

pub mod openai;

pub use openai::{OpenAiSource, SourceError};

/// One step of a fragment stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamItem {
    /// The next piece of text. May be empty; order matters.
    Fragment(String),
    /// The source finished normally.
    Done,
    /// The source failed mid-stream. The session treats this as `Done` with
    /// whatever buffer content exists being flushed, then reports the reason.
    Failed(String),
}

/// An asynchronous, ordered sequence of UTF-8 text fragments.
///
/// Implementations must keep returning `Done` (or `Failed`) once the stream
/// has ended; callers stop polling after the first terminal item.
#[async_trait]
pub trait FragmentSource: Send {
    async fn next_fragment(&mut self) -> StreamItem;
}

/// Deterministic in-memory source for tests and demos.
///
/// Yields the scripted items in order, then `Done` forever.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    items: VecDeque<StreamItem>,
}

impl ScriptedSource {
    /// Script a sequence of fragments followed by a normal completion.
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: fragments
                .into_iter()
                .map(|f| StreamItem::Fragment(f.into()))
                .collect(),
        }
    }

    /// Script an arbitrary item sequence, including mid-stream failure.
    pub fn with_items(items: impl IntoIterator<Item = StreamItem>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }
}

#[async_trait]
impl FragmentSource for ScriptedSource {
    async fn next_fragment(&mut self) -> StreamItem {
        self.items.pop_front().unwrap_or(StreamItem::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_source_yields_fragments_then_done() {
        let mut source = ScriptedSource::new(["a", "b"]);
        assert_eq!(
            source.next_fragment().await,
            StreamItem::Fragment("a".into())
        );
        assert_eq!(
            source.next_fragment().await,
            StreamItem::Fragment("b".into())
        );
        assert_eq!(source.next_fragment().await, StreamItem::Done);
        // Stays terminal on repeated polls.
        assert_eq!(source.next_fragment().await, StreamItem::Done);
    }

    #[tokio::test]
    async fn scripted_source_can_fail_mid_stream() {
        let mut source = ScriptedSource::with_items([
            StreamItem::Fragment("partial".into()),
            StreamItem::Failed("connection reset".into()),
        ]);
        assert_eq!(
            source.next_fragment().await,
            StreamItem::Fragment("partial".into())
        );
        assert_eq!(
            source.next_fragment().await,
            StreamItem::Failed("connection reset".into())
        );
    }
}
