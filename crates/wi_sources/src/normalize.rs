//! Turns raw provider items into [`Article`]s.

use chrono::{DateTime, FixedOffset};
use scraper::Html;
use serde::Deserialize;
use url::Url;
use wi_core::Article;

/// One item as the news-search provider returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNewsItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub originallink: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "pubDate")]
    pub pub_date: String,
}

impl RawNewsItem {
    /// The publisher's link when the provider knows it, else the provider's own.
    pub fn canonical_link(&self) -> Option<&str> {
        [self.originallink.trim(), self.link.trim()]
            .into_iter()
            .find(|l| !l.is_empty())
    }

    /// `None` when the item carries no link at all, since such an item
    /// cannot be deduplicated.
    pub fn into_article(self, company: &str) -> Option<Article> {
        let link = self.canonical_link()?.to_string();
        Some(Article {
            id: canonical_id(&link),
            company: company.to_string(),
            title: clean_html(&self.title),
            description: clean_html(&self.description),
            published_at: parse_pub_date(&self.pub_date),
            link,
            body_text: None,
        })
    }
}

/// Stable identity for a link: scheme and host lower-cased, fragment
/// dropped, trailing slash trimmed.
pub fn canonical_id(link: &str) -> String {
    match Url::parse(link.trim()) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.as_str().trim_end_matches('/').to_string()
        }
        Err(_) => link.trim().trim_end_matches('/').to_lowercase(),
    }
}

/// Strip markup and decode entities, collapsing whitespace.
pub fn clean_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(text);
    let plain: String = fragment.root_element().text().collect();
    plain.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// RFC 2822 timestamps such as `Mon, 18 Dec 2023 14:30:00 +0900`.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc2822(raw) {
        Ok(dt) => Some(dt),
        Err(e) => {
            tracing::debug!("Unparsable pubDate {:?}: {}", raw, e);
            None
        }
    }
}
