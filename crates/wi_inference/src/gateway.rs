//! Typed, retrying wrappers over the classifier and summarizer models.

use std::sync::Arc;

use wi_core::{
    Article, ClassificationModel, ClassificationOutcome, Error, FilterOutcome, Label,
    PipelineConfig, RawClassification, Result, SummarizationModel, SummaryKind, SummaryOutcome,
};

use crate::retry::RetryPolicy;

/// Which raw classifier answers count as "important".
#[derive(Debug, Clone)]
pub struct LabelPolicy {
    pass_codes: Vec<String>,
    min_confidence: f64,
}

impl LabelPolicy {
    pub fn new(pass_codes: Vec<String>, min_confidence: f64) -> Self {
        Self {
            pass_codes,
            min_confidence,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.pass_labels.clone(), config.min_confidence)
    }

    pub fn decide(&self, raw: &RawClassification) -> Label {
        let code = raw.label.as_code();
        let important = self.pass_codes.iter().any(|c| c.eq_ignore_ascii_case(&code));
        if important && raw.confidence >= self.min_confidence {
            Label::Pass
        } else {
            Label::Reject
        }
    }
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self::new(vec!["1".to_string()], 0.0)
    }
}

pub struct ClassificationGateway {
    model: Arc<dyn ClassificationModel>,
    retry: RetryPolicy,
    labels: LabelPolicy,
}

impl ClassificationGateway {
    pub fn new(model: Arc<dyn ClassificationModel>, retry: RetryPolicy, labels: LabelPolicy) -> Self {
        Self {
            model,
            retry,
            labels,
        }
    }

    /// Text sent to the classifier: title and body on separate lines.
    pub fn input_text(article: &Article) -> String {
        format!("{}\n{}", article.title, article.body())
    }

    /// Classify one keyword-passed article. Errors only once retries are spent.
    pub async fn classify(&self, filtered: FilterOutcome) -> Result<ClassificationOutcome> {
        let text = Self::input_text(&filtered.article);
        let gateway = self.model.name();
        let raw = self
            .retry
            .run(gateway, || self.model.classify(&text))
            .await?;

        if !(0.0..=1.0).contains(&raw.confidence) {
            return Err(Error::GatewayBadResponse {
                gateway: gateway.to_string(),
                reason: format!("confidence {} outside [0, 1]", raw.confidence),
            });
        }

        let label = self.labels.decide(&raw);
        tracing::debug!(
            "🤖 {} → {:?} ({:.3}) {}",
            filtered.article.company,
            label,
            raw.confidence,
            filtered.article.title
        );
        Ok(ClassificationOutcome {
            filtered,
            label,
            confidence: raw.confidence,
        })
    }
}

pub struct SummarizationGateway {
    model: Arc<dyn SummarizationModel>,
    retry: RetryPolicy,
}

impl SummarizationGateway {
    pub fn new(model: Arc<dyn SummarizationModel>, retry: RetryPolicy) -> Self {
        Self { model, retry }
    }

    /// Summarize one article that passed classification. An empty answer
    /// becomes a fallback summary; errors only once retries are spent.
    pub async fn summarize(&self, classified: ClassificationOutcome) -> Result<SummaryOutcome> {
        let article = &classified.filtered.article;
        let summary = self
            .retry
            .run(self.model.name(), || {
                self.model.summarize(&article.title, article.body())
            })
            .await?;

        let (summary, kind) = if summary.trim().is_empty() {
            tracing::warn!("⚠️ Empty summary for {}, using fallback", article.title);
            (fallback_summary(article), SummaryKind::Fallback)
        } else {
            (summary.trim().to_string(), SummaryKind::Generated)
        };

        Ok(SummaryOutcome {
            classified,
            summary,
            kind,
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// At most 100 characters built from the company, title and description.
pub fn fallback_summary(article: &Article) -> String {
    let company = &article.company;
    let title = article.title.trim();
    let description = article.description.trim();

    if title.is_empty() {
        return format!("{} 관련 뉴스가 발표되었습니다.", company);
    }
    if description.is_empty() {
        return truncate(&format!("{} 관련 뉴스: {}", company, truncate(title, 70)), 100);
    }

    let mut summary = format!("{} 관련 뉴스: {}", company, truncate(title, 30));
    let used = summary.chars().count();
    if used < 80 {
        let remaining = 100usize.saturating_sub(used + 5);
        if remaining > 10 {
            summary.push_str(&format!(" - {}...", truncate(description, remaining)));
        }
    }
    truncate(&summary, 100)
}
