use std::time::Duration;

use crate::defaults::{default_companies, default_keywords};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            multiplier: 2.0,
        }
    }
}

/// Everything a run needs besides the company list.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub classifier_url: String,
    pub summarizer_url: String,
    pub naver_base_url: String,
    pub naver_client_id: Option<String>,
    pub naver_client_secret: Option<String>,
    pub default_companies: Vec<String>,
    pub max_articles_per_company: usize,
    pub keywords: Vec<String>,
    pub company_concurrency: usize,
    pub article_concurrency: usize,
    pub request_timeout: Duration,
    pub retry: RetryConfig,
    pub run_deadline: Option<Duration>,
    pub pass_labels: Vec<String>,
    pub min_confidence: f64,
    pub title_similarity_threshold: Option<u8>,
    /// Fetch article pages for full text before classification.
    pub fetch_article_bodies: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            classifier_url: "http://localhost:8087/predict".to_string(),
            summarizer_url: "http://localhost:8088/summarize".to_string(),
            naver_base_url: "https://openapi.naver.com/v1/search/news.json".to_string(),
            naver_client_id: None,
            naver_client_secret: None,
            default_companies: default_companies(),
            max_articles_per_company: 100,
            keywords: default_keywords(),
            company_concurrency: 4,
            article_concurrency: 8,
            request_timeout: Duration::from_secs(15),
            retry: RetryConfig::default(),
            run_deadline: Some(Duration::from_secs(300)),
            pass_labels: vec!["1".to_string()],
            min_confidence: 0.0,
            title_similarity_threshold: Some(85),
            fetch_article_bodies: false,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `WI_*` variables, after loading `.env`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but reading through `lookup`, so tests need not touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(v) = var("WI_CLASSIFIER_URL") {
            config.classifier_url = v;
        }
        if let Some(v) = var("WI_SUMMARIZER_URL") {
            config.summarizer_url = v;
        }
        if let Some(v) = var("WI_NAVER_BASE_URL") {
            config.naver_base_url = v;
        }
        config.naver_client_id = var("NAVER_CLIENT_ID");
        config.naver_client_secret = var("NAVER_CLIENT_SECRET");
        if let Some(v) = var("WI_DEFAULT_COMPANIES") {
            config.default_companies = split_list(&v);
        }
        if let Some(v) = var("WI_MAX_ARTICLES") {
            config.max_articles_per_company = parse_number("WI_MAX_ARTICLES", &v)?;
        }
        if let Some(v) = var("WI_KEYWORDS") {
            config.keywords = split_list(&v);
        }
        if let Some(v) = var("WI_COMPANY_CONCURRENCY") {
            config.company_concurrency = parse_number("WI_COMPANY_CONCURRENCY", &v)?;
        }
        if let Some(v) = var("WI_ARTICLE_CONCURRENCY") {
            config.article_concurrency = parse_number("WI_ARTICLE_CONCURRENCY", &v)?;
        }
        if let Some(v) = var("WI_REQUEST_TIMEOUT") {
            config.request_timeout = parse_duration(&v)?;
        }
        if let Some(v) = var("WI_MAX_RETRIES") {
            config.retry.max_retries = parse_number("WI_MAX_RETRIES", &v)?;
        }
        if let Some(v) = var("WI_RETRY_INITIAL") {
            config.retry.initial_backoff = parse_duration(&v)?;
        }
        if let Some(v) = var("WI_RETRY_MAX") {
            config.retry.max_backoff = parse_duration(&v)?;
        }
        if let Some(v) = var("WI_RUN_DEADLINE") {
            let deadline = parse_duration(&v)?;
            config.run_deadline = (!deadline.is_zero()).then_some(deadline);
        }
        if let Some(v) = var("WI_PASS_LABELS") {
            config.pass_labels = split_list(&v);
        }
        if let Some(v) = var("WI_MIN_CONFIDENCE") {
            config.min_confidence = v
                .parse()
                .map_err(|_| Error::Config(format!("WI_MIN_CONFIDENCE is not a number: {}", v)))?;
        }
        if let Some(v) = var("WI_TITLE_SIMILARITY") {
            let threshold: u8 = parse_number("WI_TITLE_SIMILARITY", &v)?;
            config.title_similarity_threshold = (threshold > 0).then_some(threshold);
        }
        if let Some(v) = var("WI_FETCH_BODIES") {
            config.fetch_article_bodies = matches!(v.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.company_concurrency == 0 || self.article_concurrency == 0 {
            return Err(Error::Config("concurrency limits must be at least 1".to_string()));
        }
        if self.max_articles_per_company == 0 {
            return Err(Error::Config("article cap must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(Error::Config(format!(
                "min confidence {} is outside [0, 1]",
                self.min_confidence
            )));
        }
        if self.title_similarity_threshold.map_or(false, |t| t > 100) {
            return Err(Error::Config("title similarity threshold is a percentage".to_string()));
        }
        if self.pass_labels.is_empty() {
            return Err(Error::Config("at least one pass label is required".to_string()));
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        fn preview(val: &Option<String>) -> String {
            match val {
                Some(v) => {
                    let head: String = v.chars().take(5).collect();
                    format!("{}...({} chars)", head, v.chars().count())
                }
                None => "<not set>".to_string(),
            }
        }

        tracing::info!("🔧 Config loaded:");
        tracing::info!("  classifier: {}", self.classifier_url);
        tracing::info!("  summarizer: {}", self.summarizer_url);
        tracing::info!("  NAVER_CLIENT_ID: {}", preview(&self.naver_client_id));
        tracing::info!("  NAVER_CLIENT_SECRET: {}", preview(&self.naver_client_secret));
        tracing::info!(
            "  {} default companies, {} keywords, cap {} per company",
            self.default_companies.len(),
            self.keywords.len(),
            self.max_articles_per_company
        );
        tracing::info!(
            "  concurrency: {} companies / {} articles, deadline {:?}",
            self.company_concurrency,
            self.article_concurrency,
            self.run_deadline
        );
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("{} is not a valid number: {}", key, value)))
}

/// Parse `1h15m30s`, `30m`, `500ms`, `2d` or bare seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::Config("Duration must include a number".to_string()));
    }

    let mut total_ms: u64 = 0;
    let mut chars = s.chars().peekable();
    while chars.peek().is_some() {
        let mut number = String::new();
        while let Some(c) = chars.peek().copied().filter(|c| c.is_ascii_digit()) {
            number.push(c);
            chars.next();
        }
        let mut unit = String::new();
        while let Some(c) = chars.peek().copied().filter(|c| c.is_ascii_alphabetic()) {
            unit.push(c);
            chars.next();
        }
        while chars.peek().map_or(false, |c| c.is_whitespace()) {
            chars.next();
        }

        if number.is_empty() {
            return Err(Error::Config(format!("Invalid duration: {}", s)));
        }
        let n: u64 = number
            .parse()
            .map_err(|_| Error::Config(format!("Invalid number in duration: {}", s)))?;
        let factor = match unit.as_str() {
            "" | "s" => 1_000,
            "ms" => 1,
            "m" => 60_000,
            "h" => 3_600_000,
            "d" => 86_400_000,
            other => return Err(Error::Config(format!("Invalid duration unit: {}", other))),
        };
        total_ms = total_ms.saturating_add(n.saturating_mul(factor));
    }

    Ok(Duration::from_millis(total_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("1h15m30s").unwrap(), Duration::from_secs(4530));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_duration(" 2m 5s ").unwrap(), Duration::from_secs(125));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("5y").is_err());
        assert!(parse_duration("1h!").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.default_companies.len(), 9);
        assert_eq!(config.max_articles_per_company, 100);
        assert_eq!(config.pass_labels, vec!["1".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("WI_DEFAULT_COMPANIES", "넥슨, 스마일게이트 ,"),
            ("WI_MAX_ARTICLES", "20"),
            ("WI_RUN_DEADLINE", "0"),
            ("WI_TITLE_SIMILARITY", "0"),
            ("WI_PASS_LABELS", "1,important"),
            ("WI_RETRY_INITIAL", "250ms"),
            ("NAVER_CLIENT_ID", "abcdefgh"),
            ("WI_FETCH_BODIES", "true"),
        ]))
        .unwrap();

        assert_eq!(config.default_companies, vec!["넥슨", "스마일게이트"]);
        assert_eq!(config.max_articles_per_company, 20);
        assert_eq!(config.run_deadline, None);
        assert_eq!(config.title_similarity_threshold, None);
        assert_eq!(config.pass_labels, vec!["1", "important"]);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(250));
        assert_eq!(config.naver_client_id.as_deref(), Some("abcdefgh"));
        assert_eq!(config.naver_client_secret, None);
        assert!(config.fetch_article_bodies);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(PipelineConfig::from_lookup(lookup(&[("WI_MAX_ARTICLES", "lots")])).is_err());
        assert!(PipelineConfig::from_lookup(lookup(&[("WI_COMPANY_CONCURRENCY", "0")])).is_err());
        assert!(PipelineConfig::from_lookup(lookup(&[("WI_MIN_CONFIDENCE", "1.5")])).is_err());
    }
}
