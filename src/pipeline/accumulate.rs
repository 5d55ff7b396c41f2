use crate::types::{Canonical, NormalizedResult};
use crate::utils::value::{as_count, as_text};
use serde_json::{Map, Value};

/// Folds decoded chunks into one [`NormalizedResult`].
///
/// Content: `choices[0].delta.content` is appended, `choices[0].message.content`
/// replaces everything accumulated so far; when a chunk has both, the full
/// message wins. Metadata (`model`, `usage`, `prompt_tokens`,
/// `generation_tokens`, `peak_memory`) is last-writer-wins across chunks.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    content: String,
    model: Option<String>,
    usage: Option<Map<String, Value>>,
    prompt_tokens: Option<u64>,
    generation_tokens: Option<u64>,
    peak_memory: Option<u64>,
    chunks: usize,
    skipped: usize,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, chunk: &Value) {
        self.chunks += 1;

        if let Some(model) = chunk.get("model").and_then(as_text) {
            self.model = Some(model);
        }
        if let Some(usage) = chunk.get("usage").and_then(Value::as_object) {
            self.usage = Some(usage.clone());
        }
        if let Some(n) = chunk.get("prompt_tokens").and_then(as_count) {
            self.prompt_tokens = Some(n);
        }
        if let Some(n) = chunk.get("generation_tokens").and_then(as_count) {
            self.generation_tokens = Some(n);
        }
        if let Some(n) = chunk.get("peak_memory").and_then(as_count) {
            self.peak_memory = Some(n);
        }

        let full = chunk
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str);
        let delta = chunk
            .pointer("/choices/0/delta/content")
            .and_then(Value::as_str);
        match (full, delta) {
            (Some(full), _) => {
                self.content.clear();
                self.content.push_str(full);
            }
            (None, Some(delta)) => self.content.push_str(delta),
            (None, None) => {}
        }
    }

    /// Record a chunk that could not be decoded.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Token counts not sent at top level are taken from the OpenAI-style
    /// `usage` block when one was seen.
    pub fn finish(self) -> NormalizedResult {
        let usage = self.usage.unwrap_or_default();
        let from_usage = |key: &str| usage.get(key).and_then(as_count);
        let prompt_tokens = self
            .prompt_tokens
            .or_else(|| from_usage("prompt_tokens"))
            .unwrap_or(0);
        let generation_tokens = self
            .generation_tokens
            .or_else(|| from_usage("completion_tokens"))
            .unwrap_or(0);

        Canonical {
            content: self.content,
            model: self.model.unwrap_or_default(),
            usage,
            prompt_tokens,
            generation_tokens,
            peak_memory: self.peak_memory.unwrap_or(0),
        }
        .into()
    }
}
