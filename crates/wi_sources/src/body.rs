use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use wi_core::{Article, BodyFetcher, Error, Result};

const GATEWAY: &str = "article-body";

/// Bodies are cut to this many characters before being sent to the models.
pub const MAX_BODY_CHARS: usize = 4000;

/// Downloads the article page and keeps its paragraph text.
pub struct HtmlBodyFetcher {
    client: Client,
}

impl HtmlBodyFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; weekly-issue/0.1)")
            .build()?;
        Ok(Self { client })
    }
}

/// Paragraphs inside `<article>` when the page has one, else every `<p>`.
pub fn extract_body(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let paragraphs = |selector: &str| -> Vec<String> {
        let Ok(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        document
            .select(&selector)
            .map(|el| el.text().collect::<String>())
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|t| !t.is_empty())
            .collect()
    };

    let mut found = paragraphs("article p");
    if found.is_empty() {
        found = paragraphs("p");
    }
    if found.is_empty() {
        return None;
    }
    Some(found.join("\n").chars().take(MAX_BODY_CHARS).collect())
}

#[async_trait]
impl BodyFetcher for HtmlBodyFetcher {
    async fn fetch_body(&self, article: &Article) -> Result<String> {
        let response = self
            .client
            .get(&article.link)
            .send()
            .await
            .map_err(|e| Error::from_gateway(GATEWAY, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::from_gateway_status(GATEWAY, status));
        }
        let html = response
            .text()
            .await
            .map_err(|e| Error::from_gateway(GATEWAY, e))?;
        extract_body(&html).ok_or_else(|| Error::GatewayBadResponse {
            gateway: GATEWAY.to_string(),
            reason: "no paragraph text found".to_string(),
        })
    }
}
