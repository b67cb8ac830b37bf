//! OpenAI-compatible chat-completions streaming source.
//!
//! Opens a `stream: true` chat completion and yields each delta's content as
//! one fragment. SSE `data:` lines may be split across network chunks, so a
//! line buffer carries partial lines between reads.

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::pin::Pin;
use thiserror::Error;

use super::{FragmentSource, StreamItem};

/// Errors raised while opening the upstream stream.
///
/// Mid-stream failures are not errors at this level; they surface as
/// [`StreamItem::Failed`] so the session can flush and terminate cleanly.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("chat completion request failed: {0}")]
    Http(#[from] reqwest::Error),
}

type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, reqwest::Error>> + Send>>;

/// Streams fragments from an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiSource {
    stream: ByteStream,
    line_buffer: String,
    pending: VecDeque<String>,
    finished: bool,
}

impl OpenAiSource {
    /// Open a streaming completion for `prompt`.
    ///
    /// `api_base` is the versioned root (e.g. `https://api.openai.com/v1`);
    /// pointing it at a local mock server is how the wire parsing is tested.
    pub async fn connect(
        client: &reqwest::Client,
        api_base: &str,
        api_key: &str,
        model: &str,
        prompt: &str,
    ) -> Result<Self, SourceError> {
        let body = json!({
            "model": model,
            "stream": true,
            "messages": [
                {"role": "system", "content": "You are a helpful assistant."},
                {"role": "user", "content": prompt},
            ],
        });

        let response = client
            .post(format!(
                "{}/chat/completions",
                api_base.trim_end_matches('/')
            ))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()));

        Ok(Self {
            stream: Box::pin(stream),
            line_buffer: String::new(),
            pending: VecDeque::new(),
            finished: false,
        })
    }

    /// Process one complete SSE line, queueing any delta content.
    fn process_line(&mut self, line: &str) {
        let Some(payload) = line.trim().strip_prefix("data:") else {
            return;
        };
        let payload = payload.trim();

        if payload == "[DONE]" {
            self.finished = true;
            return;
        }

        let Ok(value) = serde_json::from_str::<Value>(payload) else {
            tracing::debug!(line = %payload, "skipping unparseable stream line");
            return;
        };
        if let Some(content) = delta_content(&value) {
            if !content.is_empty() {
                self.pending.push_back(content.to_string());
            }
        }
    }

    fn drain_lines(&mut self) {
        while let Some(pos) = self.line_buffer.find('\n') {
            let line: String = self.line_buffer.drain(..=pos).collect();
            self.process_line(&line);
        }
    }
}

fn delta_content(value: &Value) -> Option<&str> {
    value
        .get("choices")?
        .get(0)?
        .get("delta")?
        .get("content")?
        .as_str()
}

#[async_trait]
impl FragmentSource for OpenAiSource {
    async fn next_fragment(&mut self) -> StreamItem {
        loop {
            if let Some(fragment) = self.pending.pop_front() {
                return StreamItem::Fragment(fragment);
            }
            if self.finished {
                return StreamItem::Done;
            }

            match self.stream.next().await {
                Some(Ok(chunk)) => {
                    self.line_buffer
                        .push_str(&String::from_utf8_lossy(&chunk));
                    self.drain_lines();
                }
                Some(Err(err)) => {
                    self.finished = true;
                    return StreamItem::Failed(err.to_string());
                }
                None => {
                    self.finished = true;
                    // A final partial line may still hold a delta.
                    if !self.line_buffer.is_empty() {
                        let tail = std::mem::take(&mut self.line_buffer);
                        self.process_line(&tail);
                    }
                }
            }
        }
    }
}
