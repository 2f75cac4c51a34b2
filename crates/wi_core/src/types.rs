use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A normalized news article, keyed by its canonical link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub company: String,
    pub title: String,
    pub description: String,
    pub link: String,
    /// Provider timestamp, kept in the provider's own offset.
    pub published_at: Option<DateTime<FixedOffset>>,
    pub body_text: Option<String>,
}

impl Article {
    /// Text handed to the keyword filter.
    pub fn headline_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Body used by the gateways: the fetched body when there is one,
    /// otherwise the provider's description.
    pub fn body(&self) -> &str {
        self.body_text.as_deref().unwrap_or(&self.description)
    }

    /// `YYYYMMDD`, or empty when the provider gave no usable timestamp.
    pub fn published_date(&self) -> String {
        self.published_at
            .map(|dt| dt.format("%Y%m%d").to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub article: Article,
    /// Matched keywords in configuration order, without repeats.
    pub matched_keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Pass,
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationOutcome {
    pub filtered: FilterOutcome,
    pub label: Label,
    pub confidence: f64,
}

impl ClassificationOutcome {
    pub fn passed(&self) -> bool {
        self.label == Label::Pass
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryKind {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOutcome {
    pub classified: ClassificationOutcome,
    pub summary: String,
    pub kind: SummaryKind,
}

/// Label as the classifier service reports it. The service has answered
/// with both integer and string codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLabel {
    Code(i64),
    Text(String),
}

impl RawLabel {
    pub fn as_code(&self) -> String {
        match self {
            RawLabel::Code(c) => c.to_string(),
            RawLabel::Text(t) => t.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawClassification {
    pub label: RawLabel,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

/// One summarized issue in the run response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueResult {
    pub id: String,
    pub corp: String,
    pub summary: String,
    pub original_title: String,
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
    pub news_url: String,
    pub published_date: String,
    pub summary_kind: SummaryKind,
}

impl IssueResult {
    pub fn from_outcome(outcome: SummaryOutcome) -> Self {
        let SummaryOutcome {
            classified,
            summary,
            kind,
        } = outcome;
        let ClassificationOutcome {
            filtered,
            confidence,
            ..
        } = classified;
        let published_date = filtered.article.published_date();
        let article = filtered.article;
        Self {
            id: uuid_v4(),
            corp: article.company,
            summary,
            original_title: article.title,
            confidence,
            matched_keywords: filtered.matched_keywords,
            news_url: article.link,
            published_date,
            summary_kind: kind,
        }
    }
}

fn uuid_v4() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticScope {
    Run,
    Company,
    Article,
}

/// An isolated failure that did not abort the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub scope: DiagnosticScope,
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_id: Option<String>,
    pub kind: String,
    pub message: String,
}

impl Diagnostic {
    pub fn company(company: &str, err: &crate::Error) -> Self {
        Self {
            scope: DiagnosticScope::Company,
            company: Some(company.to_string()),
            article_id: None,
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }

    pub fn article(article: &Article, err: &crate::Error) -> Self {
        Self {
            scope: DiagnosticScope::Article,
            company: Some(article.company.clone()),
            article_id: Some(article.id.clone()),
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }

    pub fn run(err: &crate::Error) -> Self {
        Self {
            scope: DiagnosticScope::Run,
            company: None,
            article_id: None,
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Aggregate outcome of one run, serialized as the `/issue/news` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRunResult {
    pub status: RunStatus,
    pub message: String,
    pub total_collected: usize,
    pub after_keyword_filter: usize,
    pub after_deduplication: usize,
    pub after_classification: usize,
    pub final_summaries: usize,
    pub companies_processed: Vec<String>,
    pub results: Vec<IssueResult>,
    pub truncated: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl PipelineRunResult {
    pub fn failed(message: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            status: RunStatus::Error,
            message: message.into(),
            total_collected: 0,
            after_keyword_filter: 0,
            after_deduplication: 0,
            after_classification: 0,
            final_summaries: 0,
            companies_processed: Vec::new(),
            results: Vec::new(),
            truncated: false,
            diagnostics,
        }
    }

    /// `total_collected ≥ after_keyword_filter ≥ after_deduplication ≥
    /// after_classification ≥ final_summaries`, and one result per summary.
    pub fn counts_are_monotone(&self) -> bool {
        self.total_collected >= self.after_keyword_filter
            && self.after_keyword_filter >= self.after_deduplication
            && self.after_deduplication >= self.after_classification
            && self.after_classification >= self.final_summaries
            && self.final_summaries == self.results.len()
    }
}
