//! Session lifecycle: one segmentation stream per request/response cycle.
//!
//! A session runs as a single cooperative task. Fragments are consumed
//! serially, so a strategy's `consume` never overlaps its own `flush`, and
//! units reach the emitter in exactly the order their boundaries were
//! detected. When the consumer disconnects the emitter reports `Closed` and
//! the task stops; an in-flight classification call is simply abandoned with
//! the task.

use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tracing::Instrument;
use uuid::Uuid;

use crate::emitter::{EmitError, UnitEmitter};
use crate::segmenter::Segmenter;
use crate::source::{FragmentSource, StreamItem};
use crate::unit::{StreamEvent, Unit};

/// Delivery-rate smoothing between emitted units.
///
/// Presentation policy, not a correctness requirement: the delay after an
/// accumulated text block is longer than the delay after a topic-shift
/// marker, and both can be zeroed for tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacing {
    pub after_block: Duration,
    pub after_shift: Duration,
}

impl Pacing {
    pub fn new(after_block: Duration, after_shift: Duration) -> Self {
        Self {
            after_block,
            after_shift,
        }
    }

    /// No delays; what tests want.
    pub fn disabled() -> Self {
        Self {
            after_block: Duration::ZERO,
            after_shift: Duration::ZERO,
        }
    }

    fn after(&self, unit: &Unit) -> Duration {
        if unit.topic_shift {
            self.after_shift
        } else {
            self.after_block
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            after_block: Duration::from_millis(1000),
            after_shift: Duration::from_millis(500),
        }
    }
}

/// One active segmentation stream: a source, a strategy, and an emitter.
///
/// No state is shared across sessions; the session owns everything it
/// touches and is destroyed when the stream ends or errors.
pub struct Session {
    id: Uuid,
    source: Box<dyn FragmentSource>,
    segmenter: Box<dyn Segmenter>,
    pacing: Pacing,
    emitter: UnitEmitter,
}

impl Session {
    pub fn new(
        source: Box<dyn FragmentSource>,
        segmenter: Box<dyn Segmenter>,
        pacing: Pacing,
        emitter: UnitEmitter,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            segmenter,
            pacing,
            emitter,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Drive the session to completion on the current task.
    ///
    /// Terminates when the source completes (normal flush + `stream-end`),
    /// when the source fails (flush, then `stream-error` + `stream-end`), or
    /// as soon as the consumer disconnects.
    pub async fn run(mut self) {
        loop {
            // Strategies can swallow many fragments (and make classifier
            // calls) without producing a unit, so a disconnect must be
            // caught here, not only on the next emit.
            if self.emitter.is_closed() {
                tracing::debug!(session = %self.id, "consumer disconnected");
                return;
            }
            match self.source.next_fragment().await {
                StreamItem::Fragment(fragment) => {
                    let units = self.segmenter.consume(&fragment).await;
                    if self.emit_paced(units).await.is_err() {
                        tracing::debug!(session = %self.id, "consumer disconnected");
                        return;
                    }
                }
                StreamItem::Done => break,
                StreamItem::Failed(reason) => {
                    tracing::warn!(session = %self.id, error = %reason, "source failed mid-stream");
                    let units = self.segmenter.flush().await;
                    if self.emit_paced(units).await.is_err() {
                        return;
                    }
                    let _ = self.emitter.emit(StreamEvent::failed(reason));
                    let _ = self.emitter.emit(StreamEvent::end());
                    return;
                }
            }
        }

        let units = self.segmenter.flush().await;
        if self.emit_paced(units).await.is_err() {
            tracing::debug!(session = %self.id, "consumer disconnected during flush");
            return;
        }
        let _ = self.emitter.emit(StreamEvent::end());
    }

    async fn emit_paced(&mut self, units: Vec<Unit>) -> Result<(), EmitError> {
        for unit in units {
            let delay = self.pacing.after(&unit);
            self.emitter.emit(StreamEvent::unit(unit))?;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(())
    }

    /// Launch `run` on a background task.
    pub fn spawn(self) -> SessionHandle {
        let id = self.id;
        let span = tracing::info_span!("session", id = %id);
        let handle = tokio::spawn(self.run().instrument(span));
        SessionHandle { id, handle }
    }
}

/// Handle to a spawned session task.
pub struct SessionHandle {
    id: Uuid,
    handle: JoinHandle<()>,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Cancel the session. The task is dropped at its next suspension point;
    /// any in-flight classification call is abandoned, not awaited.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the session task to finish.
    pub async fn join(self) -> Result<(), JoinError> {
        self.handle.await
    }
}
