use std::fmt;

use wi_core::{ClassificationModel, RawClassification, RawLabel, Result, SummarizationModel};

/// Offline classifier for local runs. Confidence is derived from the text so
/// the same article always gets the same answer.
pub struct DummyClassifier;

impl fmt::Debug for DummyClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyClassifier").finish()
    }
}

impl DummyClassifier {
    pub fn new() -> Self {
        Self
    }

    fn confidence(text: &str) -> f64 {
        let sum: u64 = text.chars().map(|c| c as u64).sum();
        (sum % 1000) as f64 / 999.0
    }
}

impl Default for DummyClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ClassificationModel for DummyClassifier {
    fn name(&self) -> &str {
        "dummy-classifier"
    }

    async fn classify(&self, text: &str) -> Result<RawClassification> {
        let confidence = Self::confidence(text);
        let label = if confidence >= 0.5 { 1 } else { 0 };
        Ok(RawClassification {
            label: RawLabel::Code(label),
            confidence,
        })
    }
}

/// Offline summarizer: the first 20 words of the body, or of the title when
/// the body is empty.
pub struct DummySummarizer;

impl fmt::Debug for DummySummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummySummarizer").finish()
    }
}

impl DummySummarizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummySummarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SummarizationModel for DummySummarizer {
    fn name(&self) -> &str {
        "dummy-summarizer"
    }

    async fn summarize(&self, title: &str, body: &str) -> Result<String> {
        let source = if body.trim().is_empty() { title } else { body };
        let words: Vec<&str> = source.split_whitespace().take(20).collect();
        Ok(words.join(" "))
    }
}
