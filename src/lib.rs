//! # Segstream: Incremental Stream Segmentation
//!
//! Segstream re-segments a token-by-token text stream (as produced by an
//! autoregressive language model) into complete, human-consumable units:
//! sentences, paragraphs, or token-budgeted semantic chunks. Each unit is
//! emitted as soon as its boundary is known, over a persistent
//! server-sent-event stream.
//!
//! ## Core Concepts
//!
//! - **Fragments**: Incremental pieces of text received from a model stream
//! - **Segmenters**: Stateful strategies that buffer fragments and detect unit
//!   boundaries
//! - **Units**: Complete, trimmed segments, optionally tagged as topic shifts
//! - **Sessions**: One segmentation stream per request, cancelled when the
//!   consumer disconnects
//!
//! ## Quick Start
//!
//! ```
//! use segstream::segmenter::{Segmenter, SentenceSegmenter};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut segmenter = SentenceSegmenter::new();
//!
//! // Fragments arrive one at a time; complete sentences come out.
//! assert!(segmenter.consume("Hello").await.is_empty());
//! let units = segmenter.consume(" world.").await;
//! assert_eq!(units[0].text, "Hello world.");
//! # });
//! ```
//!
//! The boundary heuristic only looks at the *end* of the buffer, so a period
//! in the middle of a fragment does not split there; the buffer closes at the
//! next fragment that ends on terminal punctuation. See
//! [`segmenter::SentenceSegmenter`] for the documented limitations.
//!
//! ### Driving a Full Session
//!
//! ```
//! use segstream::emitter::unit_channel;
//! use segstream::segmenter::SentenceSegmenter;
//! use segstream::session::{Pacing, Session};
//! use segstream::source::ScriptedSource;
//! use segstream::unit::StreamEvent;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let source = ScriptedSource::new(["Hello", " world.", " Bye."]);
//! let (emitter, mut stream) = unit_channel();
//!
//! let session = Session::new(
//!     Box::new(source),
//!     Box::new(SentenceSegmenter::new()),
//!     Pacing::disabled(),
//!     emitter,
//! );
//! session.spawn();
//!
//! let mut texts = Vec::new();
//! while let Some(event) = stream.recv().await {
//!     match event {
//!         StreamEvent::Unit { unit, .. } => texts.push(unit.text),
//!         StreamEvent::EndOfStream { .. } => break,
//!         StreamEvent::Failed { .. } => unreachable!(),
//!     }
//! }
//! assert_eq!(texts, vec!["Hello world.", "Bye."]);
//! # });
//! ```
//!
//! ## Module Guide
//!
//! - [`unit`] - The `Unit` data model and the tagged `StreamEvent` emission type
//! - [`source`] - Fragment sources, including the OpenAI-compatible streaming client
//! - [`segmenter`] - Sentence, paragraph, and token-budgeted semantic strategies
//! - [`chunking`] - Topic classification, token counting, and sentence splitting
//! - [`emitter`] - The unit event channel between a session and its consumer
//! - [`session`] - Session lifecycle, pacing, and cancellation
//! - [`config`] - Policy knobs resolved from the environment

pub mod chunking;
pub mod config;
pub mod emitter;
pub mod segmenter;
pub mod session;
pub mod source;
pub mod unit;
