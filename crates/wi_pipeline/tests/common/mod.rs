#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use wi_core::{
    Article, ArticleSource, BodyFetcher, ClassificationModel, Error, PipelineConfig,
    RawClassification, RawLabel, Result, RetryConfig, SummarizationModel,
};
use wi_pipeline::PipelineOrchestrator;

pub fn article(company: &str, id: &str, title: &str) -> Article {
    Article {
        id: format!("https://news.example.com/{}", id),
        company: company.to_string(),
        title: title.to_string(),
        description: String::new(),
        link: format!("https://news.example.com/{}", id),
        published_at: None,
        body_text: None,
    }
}

enum Behaviour {
    Articles(Vec<Article>),
    Unavailable,
    Quota,
    Slow(Duration, Vec<Article>),
}

/// In-memory source keyed by company. Unknown companies return nothing.
#[derive(Default)]
pub struct FakeSource {
    companies: HashMap<String, Behaviour>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, company: &str, articles: Vec<Article>) -> Self {
        self.companies
            .insert(company.to_string(), Behaviour::Articles(articles));
        self
    }

    pub fn unavailable(mut self, company: &str) -> Self {
        self.companies
            .insert(company.to_string(), Behaviour::Unavailable);
        self
    }

    pub fn quota_exceeded(mut self, company: &str) -> Self {
        self.companies.insert(company.to_string(), Behaviour::Quota);
        self
    }

    pub fn slow(mut self, company: &str, delay: Duration, articles: Vec<Article>) -> Self {
        self.companies
            .insert(company.to_string(), Behaviour::Slow(delay, articles));
        self
    }

    pub fn called(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ArticleSource for FakeSource {
    fn name(&self) -> &str {
        "fake"
    }

    async fn fetch(&self, company: &str, limit: usize) -> Result<Vec<Article>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(company.to_string());
        }
        match self.companies.get(company) {
            None => Ok(Vec::new()),
            Some(Behaviour::Articles(articles)) => Ok(articles.iter().take(limit).cloned().collect()),
            Some(Behaviour::Unavailable) => Err(Error::SourceUnavailable {
                company: company.to_string(),
                reason: "connection refused".to_string(),
            }),
            Some(Behaviour::Quota) => Err(Error::SourceQuotaExceeded {
                company: company.to_string(),
            }),
            Some(Behaviour::Slow(delay, articles)) => {
                tokio::time::sleep(*delay).await;
                Ok(articles.iter().take(limit).cloned().collect())
            }
        }
    }
}

/// Decides from markers in the text:
/// `[pass]` → label 1, `[timeout]` → always times out, `[slow]` → hangs,
/// anything else → label 0.
#[derive(Default)]
pub struct MarkerClassifier {
    pub calls: AtomicUsize,
    pub texts: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
    pub delay: Option<Duration>,
}

impl MarkerClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ClassificationModel for MarkerClassifier {
    fn name(&self) -> &str {
        "classifier"
    }

    async fn classify(&self, text: &str) -> Result<RawClassification> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut texts) = self.texts.lock() {
            texts.push(text.to_string());
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if text.contains("[slow]") {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if text.contains("[timeout]") {
            return Err(Error::GatewayTimeout {
                gateway: "classifier".to_string(),
            });
        }
        let (code, confidence) = if text.contains("[pass]") { (1, 0.92) } else { (0, 0.81) };
        Ok(RawClassification {
            label: RawLabel::Code(code),
            confidence,
        })
    }
}

/// `[fail]` in the title → bad response, `[empty]` → empty summary,
/// otherwise `요약: <title>`.
#[derive(Default)]
pub struct MarkerSummarizer {
    pub calls: AtomicUsize,
}

#[async_trait]
impl SummarizationModel for MarkerSummarizer {
    fn name(&self) -> &str {
        "summarizer"
    }

    async fn summarize(&self, title: &str, _body: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if title.contains("[fail]") {
            return Err(Error::GatewayBadResponse {
                gateway: "summarizer".to_string(),
                reason: "HTTP 422 Unprocessable Entity".to_string(),
            });
        }
        if title.contains("[empty]") {
            return Ok(String::new());
        }
        Ok(format!("요약: {}", title))
    }
}

/// Serves `본문 of <title>` for every article.
pub struct FakeBodies;

#[async_trait]
impl BodyFetcher for FakeBodies {
    async fn fetch_body(&self, article: &Article) -> Result<String> {
        if article.title.contains("[nobody]") {
            return Err(Error::GatewayTimeout {
                gateway: "article-body".to_string(),
            });
        }
        Ok(format!("본문 of {}", article.title))
    }
}

/// Keywords `출시`, fast retries, no deadline and no similar-title removal.
pub fn config() -> PipelineConfig {
    PipelineConfig {
        keywords: vec!["출시".to_string()],
        company_concurrency: 3,
        article_concurrency: 4,
        retry: RetryConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            multiplier: 2.0,
        },
        run_deadline: None,
        title_similarity_threshold: None,
        ..PipelineConfig::default()
    }
}

pub struct Harness {
    pub source: Arc<FakeSource>,
    pub classifier: Arc<MarkerClassifier>,
    pub summarizer: Arc<MarkerSummarizer>,
    pub orchestrator: PipelineOrchestrator,
}

pub fn harness(config: PipelineConfig, source: FakeSource) -> Harness {
    harness_with(config, source, MarkerClassifier::new())
}

pub fn harness_with(config: PipelineConfig, source: FakeSource, classifier: MarkerClassifier) -> Harness {
    let source = Arc::new(source);
    let classifier = Arc::new(classifier);
    let summarizer = Arc::new(MarkerSummarizer::default());
    let orchestrator = PipelineOrchestrator::new(
        config,
        source.clone(),
        classifier.clone(),
        summarizer.clone(),
    );
    Harness {
        source,
        classifier,
        summarizer,
        orchestrator,
    }
}

pub fn companies(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
