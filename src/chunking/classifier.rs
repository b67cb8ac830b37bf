//! Topic-shift classification over an accumulated text block.
//!
//! A [`TopicClassifier`] returns the raw marked strings from the external
//! text-understanding call; [`segment_topics`] wraps it with marker parsing
//! and the whole-block fallback so callers never see an error and never lose
//! text.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// Reserved marker prefixing entries that begin a new topic.
pub const TOPIC_SHIFT_MARKER: &str = "[TOPIC SHIFT]";

/// Errors from the external classification call.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classification request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("classification response missing message content")]
    MissingContent,
    #[error("classification response is not a JSON list of strings: {0}")]
    Unparseable(#[from] serde_json::Error),
}

/// External capability that partitions a text block at topic boundaries.
///
/// Returns the ordered entries as the service produced them, each optionally
/// prefixed with [`TOPIC_SHIFT_MARKER`]. Parsing and failure recovery live in
/// [`segment_topics`], not here.
#[async_trait]
pub trait TopicClassifier: Send + Sync {
    async fn classify(&self, block: &str) -> Result<Vec<String>, ClassifyError>;
}

pub type SharedClassifier = Arc<dyn TopicClassifier>;

/// One parsed partition of a classified block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicSegment {
    pub topic_shift: bool,
    pub text: String,
}

impl TopicSegment {
    pub fn continuation(text: impl Into<String>) -> Self {
        Self {
            topic_shift: false,
            text: text.into(),
        }
    }

    pub fn shift(text: impl Into<String>) -> Self {
        Self {
            topic_shift: true,
            text: text.into(),
        }
    }
}

/// Parse marked entries into segments, stripping the marker token.
///
/// Entries that are empty after stripping and trimming carry no text and are
/// dropped.
pub fn parse_marked(entries: Vec<String>) -> Vec<TopicSegment> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let (topic_shift, text) = match entry.trim().strip_prefix(TOPIC_SHIFT_MARKER) {
                Some(rest) => (true, rest.trim().to_string()),
                None => (false, entry.trim().to_string()),
            };
            if text.is_empty() {
                None
            } else {
                Some(TopicSegment { topic_shift, text })
            }
        })
        .collect()
}

/// Classify `block`, degrading gracefully on any failure.
///
/// On a failed call or an unparseable response the entire block comes back
/// as a single non-shift segment; the text is never dropped and the error
/// never reaches the caller.
pub async fn segment_topics(classifier: &dyn TopicClassifier, block: &str) -> Vec<TopicSegment> {
    match classifier.classify(block).await {
        Ok(entries) => {
            let segments = parse_marked(entries);
            if segments.is_empty() {
                // An empty partition would lose the block.
                vec![TopicSegment::continuation(block.trim())]
            } else {
                segments
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "topic classification failed; keeping block intact");
            vec![TopicSegment::continuation(block.trim())]
        }
    }
}

/// Classifier backed by an OpenAI-compatible chat completion.
///
/// Prompts the model to re-emit the block as a JSON list of strings with
/// [`TOPIC_SHIFT_MARKER`] prefixing genuine topic transitions.
pub struct OpenAiClassifier {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl OpenAiClassifier {
    pub fn new(
        client: reqwest::Client,
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn prompt(block: &str) -> String {
        format!(
            "You are an expert in text structure. Given a story, segment it at major \
             topic transitions. Only add '{TOPIC_SHIFT_MARKER}' at real topic changes, \
             not at every sentence.\n\n\
             Output format: A JSON list of strings like:\n\
             [\n\
               \"This is the intro.\",\n\
               \"{TOPIC_SHIFT_MARKER} Something new happens.\",\n\
               \"Continuation of same topic.\",\n\
               \"{TOPIC_SHIFT_MARKER} Final twist.\"\n\
             ]\n\n\
             Now segment this story:\n{block}"
        )
    }
}

#[async_trait]
impl TopicClassifier for OpenAiClassifier {
    async fn classify(&self, block: &str) -> Result<Vec<String>, ClassifyError> {
        let body = json!({
            "model": self.model,
            "temperature": 0,
            "max_tokens": 800,
            "messages": [
                {
                    "role": "system",
                    "content": format!(
                        "You segment the story only at real topic transitions, \
                         using {TOPIC_SHIFT_MARKER} as a marker."
                    ),
                },
                {"role": "user", "content": Self::prompt(block)},
            ],
        });

        let response: Value = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.api_base.trim_end_matches('/')
            ))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let content = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or(ClassifyError::MissingContent)?;

        Ok(serde_json::from_str(content.trim())?)
    }
}
