//! The incremental segmentation strategies.
//!
//! Each strategy is an explicit state machine owning a buffer: `consume`
//! appends one fragment and returns the units whose boundaries that fragment
//! completed; `flush` drains whatever remains once the source has signalled
//! completion. State lives in fields, not captured coroutine variables, so a
//! strategy can be unit-tested without driving a live stream.
//!
//! Shared invariants:
//!
//! * Round-trip: emitted units plus the current buffer reconstruct the
//!   concatenated input, modulo whitespace trimming at unit boundaries (and
//!   marker insertion/removal on the semantic path).
//! * No text is ever dropped: a buffer that never reaches a boundary still
//!   yields its content at flush.
//! * Flush is idempotent: a second call produces nothing.
//! * There are no fatal errors; all failures downstream of a strategy are
//!   absorbed (see [`crate::chunking::segment_topics`]).

use async_trait::async_trait;

use crate::unit::Unit;

mod paragraph;
mod semantic;
mod sentence;

pub use paragraph::ParagraphSegmenter;
pub use semantic::SemanticSegmenter;
pub use sentence::SentenceSegmenter;

/// A stateful buffering strategy over an unbounded fragment sequence.
///
/// `consume` is invoked serially as fragments arrive and never runs
/// concurrently with `flush`; `flush` is called exactly once by the session
/// (calling it again is harmless and yields nothing).
#[async_trait]
pub trait Segmenter: Send {
    /// Append one fragment, returning any units it completed, in boundary
    /// order. Empty fragments are no-ops.
    async fn consume(&mut self, fragment: &str) -> Vec<Unit>;

    /// Drain remaining buffered text after the source has completed.
    async fn flush(&mut self) -> Vec<Unit>;
}
