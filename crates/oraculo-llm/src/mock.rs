//! Test-only mock LLM provider.

use std::sync::{Arc, Mutex};

use crate::provider::{LlmProvider, Message};

#[derive(Debug, Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<String>>>,
    pub default_response: String,
    pub embedding_dim: usize,
    pub fail_chat: bool,
    pub fail_embed: bool,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            default_response: "mock response".into(),
            embedding_dim: 8,
            fail_chat: false,
            fail_embed: false,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_chat: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing_embed() -> Self {
        Self {
            fail_embed: true,
            ..Self::default()
        }
    }

    /// Deterministic unit vector derived from the text bytes, so distinct
    /// texts embed differently and similarity ordering is reproducible.
    #[must_use]
    pub fn embed_text(text: &str, dim: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; dim.max(1)];
        let len = v.len();
        for (i, b) in text.bytes().enumerate() {
            v[i % len] += f32::from(b) / 255.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl LlmProvider for MockProvider {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, _messages: &[Message]) -> Result<String, crate::LlmError> {
        if self.fail_chat {
            return Err(crate::LlmError::Other("mock LLM error".into()));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, crate::LlmError> {
        if self.fail_embed {
            return Err(crate::LlmError::Other("mock embed error".into()));
        }
        Ok(Self::embed_text(text, self.embedding_dim))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, crate::LlmError> {
        if self.fail_embed {
            return Err(crate::LlmError::Other("mock embed error".into()));
        }
        Ok(texts
            .iter()
            .map(|t| Self::embed_text(t, self.embedding_dim))
            .collect())
    }
}
