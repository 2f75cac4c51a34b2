use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use wi_core::{Article, ArticleSource, Error, Result};

use crate::normalize::RawNewsItem;

/// Serves provider-shaped items from a JSON file keyed by company name.
///
/// Companies missing from the file yield no articles; a company mapped to
/// `null` behaves as an unreachable provider.
#[derive(Debug, Default)]
pub struct FixtureSource {
    items: HashMap<String, Option<Vec<RawNewsItem>>>,
}

impl FixtureSource {
    pub fn from_json(json: &str) -> Result<Self> {
        let items = serde_json::from_str(json)?;
        Ok(Self { items })
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }
}

#[async_trait]
impl ArticleSource for FixtureSource {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn fetch(&self, company: &str, limit: usize) -> Result<Vec<Article>> {
        match self.items.get(company) {
            None => Ok(Vec::new()),
            Some(None) => Err(Error::SourceUnavailable {
                company: company.to_string(),
                reason: "fixture marks company unreachable".to_string(),
            }),
            Some(Some(items)) => Ok(items
                .iter()
                .cloned()
                .filter_map(|item| item.into_article(company))
                .take(limit)
                .collect()),
        }
    }
}
