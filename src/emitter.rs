//! The unit event channel between a session and its one live consumer.
//!
//! A session owns the [`UnitEmitter`]; the transport handler owns the
//! [`UnitStream`]. Dropping the stream is the disconnect signal: the next
//! `emit` returns [`EmitError::Closed`] and the session task winds down.
//! Units are fire-and-forget: there is no durability and no second
//! consumer.

use futures_util::Stream;
use thiserror::Error;
use tokio::time::{timeout, Duration};

use crate::unit::StreamEvent;

/// Errors that can occur when emitting an event.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("unit stream closed")]
    Closed,
}

/// Create a connected emitter/stream pair for one session.
pub fn unit_channel() -> (UnitEmitter, UnitStream) {
    let (tx, rx) = flume::unbounded();
    (UnitEmitter { tx }, UnitStream { rx })
}

/// Producer side: synchronous, non-blocking emission.
#[derive(Clone, Debug)]
pub struct UnitEmitter {
    tx: flume::Sender<StreamEvent>,
}

impl UnitEmitter {
    pub fn emit(&self, event: StreamEvent) -> Result<(), EmitError> {
        self.tx.send(event).map_err(|_| EmitError::Closed)
    }

    /// True once the paired [`UnitStream`] has been dropped. Lets a session
    /// stop pulling fragments (and making external calls) without having to
    /// produce a unit first.
    pub fn is_closed(&self) -> bool {
        self.tx.is_disconnected()
    }
}

/// Consumer side: one receiver per session.
#[derive(Debug)]
pub struct UnitStream {
    rx: flume::Receiver<StreamEvent>,
}

impl UnitStream {
    /// Receive the next event; `None` once the session is gone and the
    /// channel is drained.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.rx.recv_async().await.ok()
    }

    pub fn try_recv(&mut self) -> Option<StreamEvent> {
        self.rx.try_recv().ok()
    }

    /// Receive with a deadline; `None` on timeout or channel close.
    pub async fn next_timeout(&mut self, duration: Duration) -> Option<StreamEvent> {
        timeout(duration, self.recv()).await.ok().flatten()
    }

    /// Adapt into a `futures` stream, e.g. for an SSE response body.
    pub fn into_async_stream(self) -> impl Stream<Item = StreamEvent> {
        self.rx.into_stream()
    }

    /// Drain every event until the channel closes. Test helper.
    pub async fn collect_all(mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.recv().await {
            events.push(event);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Unit;

    #[tokio::test]
    async fn events_arrive_in_emission_order() {
        let (emitter, mut stream) = unit_channel();
        emitter.emit(StreamEvent::unit(Unit::text("first"))).unwrap();
        emitter.emit(StreamEvent::unit(Unit::text("second"))).unwrap();
        emitter.emit(StreamEvent::end()).unwrap();

        assert_eq!(stream.recv().await.unwrap().data(), "first");
        assert_eq!(stream.recv().await.unwrap().data(), "second");
        assert!(matches!(
            stream.recv().await,
            Some(StreamEvent::EndOfStream { .. })
        ));
    }

    #[tokio::test]
    async fn dropped_stream_closes_the_emitter() {
        let (emitter, stream) = unit_channel();
        assert!(!emitter.is_closed());
        drop(stream);
        assert!(emitter.is_closed());
        assert!(matches!(
            emitter.emit(StreamEvent::end()),
            Err(EmitError::Closed)
        ));
    }

    #[tokio::test]
    async fn recv_returns_none_after_emitter_drop() {
        let (emitter, mut stream) = unit_channel();
        emitter.emit(StreamEvent::unit(Unit::text("only"))).unwrap();
        drop(emitter);
        assert!(stream.recv().await.is_some());
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn next_timeout_gives_up() {
        let (_emitter, mut stream) = unit_channel();
        assert!(stream
            .next_timeout(Duration::from_millis(10))
            .await
            .is_none());
    }
}
