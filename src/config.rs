//! Policy knobs for a segmentation deployment, resolved from the
//! environment with builder-style overrides.

use std::sync::Arc;
use std::time::Duration;

use crate::chunking::tokenizer::default_counter;
use crate::chunking::OpenAiClassifier;
use crate::segmenter::{ParagraphSegmenter, Segmenter, SemanticSegmenter, SentenceSegmenter};
use crate::session::Pacing;

/// Which buffering strategy a session runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    #[default]
    Sentence,
    Paragraph,
    Semantic,
}

impl Strategy {
    /// Parse a strategy name as used in query strings and env vars.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sentence" => Some(Strategy::Sentence),
            "paragraph" => Some(Strategy::Paragraph),
            "semantic" => Some(Strategy::Semantic),
            _ => None,
        }
    }
}

/// Configuration for sessions and their external calls.
///
/// The token threshold and pacing delays are policy values, not protocol
/// constants; the defaults match the behavior this engine was built to
/// reproduce (threshold 50, 1000ms after a block, 500ms after a shift).
#[derive(Clone, Debug)]
pub struct SegstreamConfig {
    pub model: String,
    pub api_base: String,
    pub api_key: String,
    pub token_limit: usize,
    pub pacing: Pacing,
    pub strategy: Strategy,
}

impl Default for SegstreamConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            token_limit: 50,
            pacing: Pacing::default(),
            strategy: Strategy::default(),
        }
    }
}

impl SegstreamConfig {
    /// Resolve configuration from the environment (plus `.env` if present).
    ///
    /// Recognized variables: `OPENAI_API_KEY`, `OPENAI_BASE_URL`,
    /// `SEGSTREAM_MODEL`, `SEGSTREAM_TOKEN_LIMIT`, `SEGSTREAM_STRATEGY`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let token_limit = std::env::var("SEGSTREAM_TOKEN_LIMIT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(defaults.token_limit);
        let strategy = std::env::var("SEGSTREAM_STRATEGY")
            .ok()
            .and_then(|raw| Strategy::from_name(&raw))
            .unwrap_or(defaults.strategy);

        Self {
            model: std::env::var("SEGSTREAM_MODEL").unwrap_or(defaults.model),
            api_base: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.api_base),
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            token_limit,
            strategy,
            pacing: defaults.pacing,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    #[must_use]
    pub fn with_token_limit(mut self, token_limit: usize) -> Self {
        self.token_limit = token_limit;
        self
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn without_pacing(self) -> Self {
        self.with_pacing(Pacing::disabled())
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_pacing_millis(self, after_block: u64, after_shift: u64) -> Self {
        self.with_pacing(Pacing::new(
            Duration::from_millis(after_block),
            Duration::from_millis(after_shift),
        ))
    }

    /// Wire up the configured strategy.
    ///
    /// The semantic strategy gets an OpenAI-backed classifier sharing
    /// `client` and the best available token counter.
    pub fn build_segmenter(&self, client: &reqwest::Client) -> Box<dyn Segmenter> {
        match self.strategy {
            Strategy::Sentence => Box::new(SentenceSegmenter::new()),
            Strategy::Paragraph => Box::new(ParagraphSegmenter::new()),
            Strategy::Semantic => {
                let classifier = Arc::new(OpenAiClassifier::new(
                    client.clone(),
                    self.api_base.clone(),
                    self.api_key.clone(),
                    self.model.clone(),
                ));
                Box::new(SemanticSegmenter::new(
                    classifier,
                    default_counter(),
                    self.token_limit,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_names_parse_case_insensitively() {
        assert_eq!(Strategy::from_name("Sentence"), Some(Strategy::Sentence));
        assert_eq!(Strategy::from_name(" PARAGRAPH "), Some(Strategy::Paragraph));
        assert_eq!(Strategy::from_name("semantic"), Some(Strategy::Semantic));
        assert_eq!(Strategy::from_name("topic"), None);
    }

    #[test]
    fn builders_override_defaults() {
        let config = SegstreamConfig::default()
            .with_model("gpt-4o")
            .with_token_limit(10)
            .without_pacing()
            .with_strategy(Strategy::Semantic);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.token_limit, 10);
        assert_eq!(config.pacing, Pacing::disabled());
        assert_eq!(config.strategy, Strategy::Semantic);
    }
}
