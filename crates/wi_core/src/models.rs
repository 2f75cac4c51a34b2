use async_trait::async_trait;
use crate::types::{Article, RawClassification};
use crate::Result;

/// External article-search provider.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Returns the name of the provider
    fn name(&self) -> &str;

    /// Fetch up to `limit` normalized articles mentioning `company`.
    ///
    /// Fails with `SourceUnavailable` or `SourceQuotaExceeded`.
    async fn fetch(&self, company: &str, limit: usize) -> Result<Vec<Article>>;
}

/// External importance classifier.
#[async_trait]
pub trait ClassificationModel: Send + Sync {
    fn name(&self) -> &str;

    /// Classify one piece of text. A single attempt; retries belong to the gateway.
    async fn classify(&self, text: &str) -> Result<RawClassification>;
}

/// External summarizer.
#[async_trait]
pub trait SummarizationModel: Send + Sync {
    fn name(&self) -> &str;

    /// Condense an article. A single attempt; retries belong to the gateway.
    async fn summarize(&self, title: &str, body: &str) -> Result<String>;
}

/// Fetches an article's full text from its link when the provider only
/// returned a snippet.
#[async_trait]
pub trait BodyFetcher: Send + Sync {
    async fn fetch_body(&self, article: &Article) -> Result<String>;
}
