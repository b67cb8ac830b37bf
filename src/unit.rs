//! The unit data model and the tagged emission type.
//!
//! A [`Unit`] is one complete, emittable segment: a sentence, a paragraph,
//! or a semantic chunk. Units travel to the transport wrapped in a
//! [`StreamEvent`], a tagged type that keeps stream termination and failure
//! distinct from unit payloads so no unit text can ever collide with a
//! control signal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One complete, trimmed, non-empty output segment.
///
/// `topic_shift` is only ever set by the semantic chunking path; sentence and
/// paragraph strategies always produce continuation units.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Unit {
    pub text: String,
    pub topic_shift: bool,
}

impl Unit {
    /// Create a continuation unit. The text is trimmed on construction.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into().trim().to_string(),
            topic_shift: false,
        }
    }

    /// Create a unit that starts a new topic.
    pub fn topic_shift(text: impl Into<String>) -> Self {
        Self {
            text: text.into().trim().to_string(),
            topic_shift: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.topic_shift {
            write!(f, "[shift] {}", self.text)
        } else {
            write!(f, "{}", self.text)
        }
    }
}

/// Everything a session can hand to its consumer.
///
/// # Transport Encoding
///
/// Each variant maps to one server-sent event. The mapping here is the single
/// source of truth for the wire format:
///
/// | Variant                        | SSE event name | data            |
/// |--------------------------------|----------------|-----------------|
/// | `Unit` (continuation)          | `message`      | trimmed text    |
/// | `Unit` (`topic_shift == true`) | `topic-shift`  | trimmed text    |
/// | `EndOfStream`                  | `stream-end`   | empty           |
/// | `Failed`                       | `stream-error` | failure reason  |
///
/// The `[TOPIC SHIFT]` marker token never appears in payloads; shift units
/// are distinguished by event name alone.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum StreamEvent {
    /// One complete unit, in boundary-detection order.
    Unit { unit: Unit, at: DateTime<Utc> },
    /// The source finished and the final flush has been emitted.
    EndOfStream { at: DateTime<Utc> },
    /// The source failed mid-stream. Whatever buffer content existed has
    /// already been flushed as units before this event.
    Failed { reason: String, at: DateTime<Utc> },
}

impl StreamEvent {
    pub fn unit(unit: Unit) -> Self {
        StreamEvent::Unit {
            unit,
            at: Utc::now(),
        }
    }

    pub fn end() -> Self {
        StreamEvent::EndOfStream { at: Utc::now() }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        StreamEvent::Failed {
            reason: reason.into(),
            at: Utc::now(),
        }
    }

    /// SSE event name for this event (see the table above).
    pub fn event_name(&self) -> &'static str {
        match self {
            StreamEvent::Unit { unit, .. } if unit.topic_shift => "topic-shift",
            StreamEvent::Unit { .. } => "message",
            StreamEvent::EndOfStream { .. } => "stream-end",
            StreamEvent::Failed { .. } => "stream-error",
        }
    }

    /// SSE data payload for this event.
    pub fn data(&self) -> &str {
        match self {
            StreamEvent::Unit { unit, .. } => &unit.text,
            StreamEvent::EndOfStream { .. } => "",
            StreamEvent::Failed { reason, .. } => reason,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            StreamEvent::Unit { at, .. }
            | StreamEvent::EndOfStream { at }
            | StreamEvent::Failed { at, .. } => *at,
        }
    }
}

impl fmt::Display for StreamEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamEvent::Unit { unit, .. } => write!(f, "{unit}"),
            StreamEvent::EndOfStream { .. } => write!(f, "<end of stream>"),
            StreamEvent::Failed { reason, .. } => write!(f, "<stream failed: {reason}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_trim_text() {
        let unit = Unit::text("  Hello world.  ");
        assert_eq!(unit.text, "Hello world.");
        assert!(!unit.topic_shift);

        let shift = Unit::topic_shift(" New topic. ");
        assert_eq!(shift.text, "New topic.");
        assert!(shift.topic_shift);
    }

    #[test]
    fn event_names_distinguish_shift_units() {
        assert_eq!(StreamEvent::unit(Unit::text("a")).event_name(), "message");
        assert_eq!(
            StreamEvent::unit(Unit::topic_shift("b")).event_name(),
            "topic-shift"
        );
        assert_eq!(StreamEvent::end().event_name(), "stream-end");
        assert_eq!(StreamEvent::failed("boom").event_name(), "stream-error");
    }

    #[test]
    fn failure_reason_is_the_payload() {
        let event = StreamEvent::failed("upstream reset");
        assert_eq!(event.data(), "upstream reset");
    }
}
