use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use wi_core::{Article, ArticleSource, Error, PipelineConfig, Result};

use crate::normalize::RawNewsItem;

/// The provider never returns more than this many items per page.
pub const MAX_DISPLAY: usize = 100;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RawNewsItem>,
}

/// Naver news-search API, newest first.
pub struct NaverNewsSource {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl std::fmt::Debug for NaverNewsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaverNewsSource")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("client_id", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl NaverNewsSource {
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let (Some(id), Some(secret)) = (&config.naver_client_id, &config.naver_client_secret) else {
            return Err(Error::Config(
                "NAVER_CLIENT_ID and NAVER_CLIENT_SECRET are required".to_string(),
            ));
        };
        Self::new(&config.naver_base_url, id, secret, config.request_timeout)
    }
}

/// Map a non-success status to the source error taxonomy.
fn status_error(company: &str, status: StatusCode) -> Option<Error> {
    if status.is_success() {
        None
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        Some(Error::SourceQuotaExceeded {
            company: company.to_string(),
        })
    } else {
        Some(Error::SourceUnavailable {
            company: company.to_string(),
            reason: format!("HTTP {}", status),
        })
    }
}

#[async_trait]
impl ArticleSource for NaverNewsSource {
    fn name(&self) -> &str {
        "naver"
    }

    async fn fetch(&self, company: &str, limit: usize) -> Result<Vec<Article>> {
        let unavailable = |e: reqwest::Error| Error::SourceUnavailable {
            company: company.to_string(),
            reason: e.to_string(),
        };
        let display = limit.clamp(1, MAX_DISPLAY).to_string();

        let display_count = &display;
        tracing::debug!("📡 Naver search for {} (display={})", company, display_count);
        let response = self
            .client
            .get(&self.base_url)
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .query(&[
                ("query", company),
                ("display", display.as_str()),
                ("start", "1"),
                ("sort", "date"),
            ])
            .send()
            .await
            .map_err(unavailable)?;

        if let Some(err) = status_error(company, response.status()) {
            return Err(err);
        }

        let body: SearchResponse = response.json().await.map_err(unavailable)?;
        let articles: Vec<Article> = body
            .items
            .into_iter()
            .filter_map(|item| item.into_article(company))
            .take(limit)
            .collect();

        tracing::info!("📰 {}: {} articles collected", company, articles.len());
        Ok(articles)
    }
}
