use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};
use wi_core::{
    ArticleSource, BodyFetcher, ClassificationModel, ClassificationOutcome, Diagnostic, Error,
    FilterOutcome, IssueResult, PipelineConfig, PipelineRunResult, RunStatus, SummarizationModel,
    SummaryOutcome,
};
use wi_inference::{ClassificationGateway, LabelPolicy, RetryPolicy, SummarizationGateway};

use crate::dedup::{deduplicate, SeenSet};
use crate::keyword::KeywordFilter;
use crate::ordered::collect_ordered;
use crate::similarity::TitleSimilarity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum CompanyStage {
    /// The deadline passed before the fetch finished.
    #[default]
    NotFetched,
    FetchFailed,
    Fetched,
}

/// One company's share of a run, built without shared state and merged
/// into the run result once.
#[derive(Debug, Default)]
struct CompanyReport {
    company: String,
    stage: CompanyStage,
    collected: usize,
    after_keyword_filter: usize,
    after_deduplication: usize,
    after_classification: usize,
    results: Vec<IssueResult>,
    diagnostics: Vec<Diagnostic>,
    truncated: bool,
}

impl CompanyReport {
    fn new(company: &str) -> Self {
        Self {
            company: company.to_string(),
            ..Default::default()
        }
    }
}

async fn until<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}

/// Drives one run: fetch, dedup, keyword filter, similar-title removal,
/// classification and summarization for every company.
pub struct PipelineOrchestrator {
    config: PipelineConfig,
    source: Arc<dyn ArticleSource>,
    classifier: ClassificationGateway,
    summarizer: SummarizationGateway,
    body_fetcher: Option<Arc<dyn BodyFetcher>>,
    keywords: KeywordFilter,
    similarity: Option<TitleSimilarity>,
}

impl PipelineOrchestrator {
    pub fn new(
        config: PipelineConfig,
        source: Arc<dyn ArticleSource>,
        classifier: Arc<dyn ClassificationModel>,
        summarizer: Arc<dyn SummarizationModel>,
    ) -> Self {
        let retry = RetryPolicy::new(&config.retry);
        Self {
            classifier: ClassificationGateway::new(
                classifier,
                retry.clone(),
                LabelPolicy::from_config(&config),
            ),
            summarizer: SummarizationGateway::new(summarizer, retry),
            keywords: KeywordFilter::new(&config.keywords),
            similarity: config.title_similarity_threshold.map(TitleSimilarity::new),
            body_fetcher: None,
            source,
            config,
        }
    }

    /// Download article pages for full text before classification.
    pub fn with_body_fetcher(mut self, fetcher: Arc<dyn BodyFetcher>) -> Self {
        self.body_fetcher = Some(fetcher);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Trimmed, de-repeated company names, or the configured defaults when
    /// none are given.
    pub fn resolve_companies(&self, companies: &[String]) -> Vec<String> {
        let mut resolved: Vec<String> = Vec::with_capacity(companies.len());
        for company in companies.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
            if !resolved.iter().any(|c| c == company) {
                resolved.push(company.to_string());
            }
        }
        if resolved.is_empty() {
            self.config.default_companies.clone()
        } else {
            resolved
        }
    }

    /// Run the pipeline for `companies` (the defaults when empty).
    ///
    /// Never fails: company and article failures land in `diagnostics`, and
    /// only a run where every company's fetch failed reports `error`.
    pub async fn run(&self, companies: &[String]) -> PipelineRunResult {
        let companies = self.resolve_companies(companies);
        if companies.is_empty() {
            let err = Error::Config("no companies to process".to_string());
            return PipelineRunResult::failed(err.to_string(), vec![Diagnostic::run(&err)]);
        }

        let started = Instant::now();
        let deadline = self.config.run_deadline.map(|d| started + d);
        info!(
            "🚀 Starting pipeline run for {} companies via {}: {}",
            companies.len(),
            self.source.name(),
            companies.join(", ")
        );

        let seen = Mutex::new(SeenSet::new());
        let article_permits = Semaphore::new(self.config.article_concurrency);
        let reports = collect_ordered(
            companies
                .iter()
                .map(|company| self.process_company(company, &seen, &article_permits, deadline)),
            self.config.company_concurrency,
            None,
        )
        .await;

        let mut result = PipelineRunResult {
            status: RunStatus::Success,
            message: String::new(),
            total_collected: 0,
            after_keyword_filter: 0,
            after_deduplication: 0,
            after_classification: 0,
            final_summaries: 0,
            companies_processed: Vec::new(),
            results: Vec::new(),
            truncated: false,
            diagnostics: Vec::new(),
        };
        let mut failed = 0;

        for report in reports.into_completed() {
            result.diagnostics.extend(report.diagnostics);
            result.truncated |= report.truncated;
            match report.stage {
                CompanyStage::Fetched => {}
                CompanyStage::FetchFailed => {
                    failed += 1;
                    continue;
                }
                CompanyStage::NotFetched => continue,
            }
            result.total_collected += report.collected;
            result.after_keyword_filter += report.after_keyword_filter;
            result.after_deduplication += report.after_deduplication;
            result.after_classification += report.after_classification;
            result.companies_processed.push(report.company);
            result.results.extend(report.results);
        }
        result.final_summaries = result.results.len();

        if failed == companies.len() {
            warn!("💥 Article collection failed for all {} companies", failed);
            let err = Error::AllCompaniesFailed;
            let mut diagnostics = result.diagnostics;
            diagnostics.push(Diagnostic::run(&err));
            return PipelineRunResult::failed(err.to_string(), diagnostics);
        }

        if result.truncated {
            warn!("⏰ Run deadline exceeded, returning partial result");
            result.diagnostics.push(Diagnostic::run(&Error::RunDeadlineExceeded));
        }
        result.message = summary_message(&result);

        info!(
            "✅ Pipeline run finished in {:?}: collected {} → keywords {} → distinct {} → classified {} → summaries {}",
            started.elapsed(),
            result.total_collected,
            result.after_keyword_filter,
            result.after_deduplication,
            result.after_classification,
            result.final_summaries
        );
        result
    }

    async fn process_company(
        &self,
        company: &str,
        seen: &Mutex<SeenSet>,
        permits: &Semaphore,
        deadline: Option<Instant>,
    ) -> CompanyReport {
        let mut report = CompanyReport::new(company);
        if deadline.is_some_and(|d| Instant::now() >= d) {
            debug!("⏰ Deadline passed before {} started", company);
            report.truncated = true;
            return report;
        }

        info!("🏢 Processing company: {}", company);
        let fetched = until(
            deadline,
            self.source.fetch(company, self.config.max_articles_per_company),
        )
        .await;
        let articles = match fetched {
            None => {
                warn!("⏰ Deadline hit while fetching articles for {}", company);
                report.truncated = true;
                return report;
            }
            Some(Err(e)) => {
                warn!("❌ Article fetch failed for {}: {}", company, e);
                report.stage = CompanyStage::FetchFailed;
                report.diagnostics.push(Diagnostic::company(company, &e));
                return report;
            }
            Some(Ok(articles)) => articles,
        };
        report.stage = CompanyStage::Fetched;

        let articles = {
            let mut seen = seen.lock().await;
            let (next, fresh) = deduplicate(std::mem::take(&mut *seen), articles);
            *seen = next;
            fresh
        };
        report.collected = articles.len();

        let filtered: Vec<FilterOutcome> = articles
            .iter()
            .filter_map(|article| self.keywords.apply(article))
            .collect();
        report.after_keyword_filter = filtered.len();

        let filtered = match &self.similarity {
            Some(similarity) => similarity.retain_distinct(filtered),
            None => filtered,
        };
        report.after_deduplication = filtered.len();
        info!(
            "📰 {}: {} new articles, {} matched keywords, {} distinct",
            company, report.collected, report.after_keyword_filter, report.after_deduplication
        );
        if filtered.is_empty() {
            return report;
        }

        let filtered = match &self.body_fetcher {
            Some(fetcher) => match self.fetch_bodies(fetcher.as_ref(), filtered, permits, deadline).await {
                Some(filtered) => filtered,
                None => {
                    report.truncated = true;
                    return report;
                }
            },
            None => filtered,
        };

        let classified = collect_ordered(
            filtered.into_iter().map(|f| self.classify_one(f, permits)),
            self.config.article_concurrency,
            deadline,
        )
        .await;
        report.truncated |= classified.truncated;

        let mut passed: Vec<ClassificationOutcome> = Vec::new();
        for outcome in classified.into_completed() {
            match outcome {
                Ok(outcome) if outcome.passed() => passed.push(outcome),
                Ok(_) => {}
                Err(diagnostic) => report.diagnostics.push(diagnostic),
            }
        }
        report.after_classification = passed.len();
        info!("🤖 {}: {} classified as important", company, passed.len());
        if report.truncated || passed.is_empty() {
            return report;
        }

        let summarized = collect_ordered(
            passed.into_iter().map(|c| self.summarize_one(c, permits)),
            self.config.article_concurrency,
            deadline,
        )
        .await;
        report.truncated |= summarized.truncated;

        for outcome in summarized.into_completed() {
            match outcome {
                Ok(summary) => report.results.push(IssueResult::from_outcome(summary)),
                Err(diagnostic) => report.diagnostics.push(diagnostic),
            }
        }
        info!("✨ {}: {} summaries", company, report.results.len());
        report
    }

    /// `None` when the deadline cut the downloads short.
    async fn fetch_bodies(
        &self,
        fetcher: &dyn BodyFetcher,
        filtered: Vec<FilterOutcome>,
        permits: &Semaphore,
        deadline: Option<Instant>,
    ) -> Option<Vec<FilterOutcome>> {
        let fetched = collect_ordered(
            filtered.into_iter().map(|mut outcome| async move {
                if outcome.article.body_text.is_some() {
                    return outcome;
                }
                let _permit = permits.acquire().await.ok();
                match fetcher.fetch_body(&outcome.article).await {
                    Ok(body) if !body.trim().is_empty() => outcome.article.body_text = Some(body),
                    Ok(_) => debug!("📄 No body text found at {}", outcome.article.link),
                    Err(e) => warn!("📄 Body fetch failed for {}: {}", outcome.article.link, e),
                }
                outcome
            }),
            self.config.article_concurrency,
            deadline,
        )
        .await;

        if fetched.truncated {
            None
        } else {
            Some(fetched.into_completed().collect())
        }
    }

    async fn classify_one(
        &self,
        filtered: FilterOutcome,
        permits: &Semaphore,
    ) -> std::result::Result<ClassificationOutcome, Diagnostic> {
        let article = filtered.article.clone();
        let _permit = permits
            .acquire()
            .await
            .map_err(|e| Diagnostic::article(&article, &Error::External(e.into())))?;
        self.classifier.classify(filtered).await.map_err(|e| {
            warn!("⚠️ Classification failed for {}: {}", article.title, e);
            Diagnostic::article(&article, &e)
        })
    }

    async fn summarize_one(
        &self,
        classified: ClassificationOutcome,
        permits: &Semaphore,
    ) -> std::result::Result<SummaryOutcome, Diagnostic> {
        let article = classified.filtered.article.clone();
        let _permit = permits
            .acquire()
            .await
            .map_err(|e| Diagnostic::article(&article, &Error::External(e.into())))?;
        self.summarizer.summarize(classified).await.map_err(|e| {
            warn!("⚠️ Summarization failed for {}: {}", article.title, e);
            Diagnostic::article(&article, &e)
        })
    }
}

/// Names the stage that emptied the run, if any.
fn summary_message(result: &PipelineRunResult) -> String {
    let message = if result.total_collected == 0 {
        "no articles collected".to_string()
    } else if result.after_keyword_filter == 0 {
        "no articles matched the keyword filter".to_string()
    } else if result.after_classification == 0 {
        "no articles classified as important".to_string()
    } else if result.final_summaries == 0 {
        "no summaries generated".to_string()
    } else {
        format!("pipeline completed with {} issues", result.final_summaries)
    };
    if result.truncated {
        format!("{} (run deadline exceeded, partial result)", message)
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use wi_core::{Article, RawClassification, RawLabel, Result};

    struct EmptySource;

    #[async_trait]
    impl ArticleSource for EmptySource {
        fn name(&self) -> &str {
            "empty"
        }

        async fn fetch(&self, _company: &str, _limit: usize) -> Result<Vec<Article>> {
            Ok(Vec::new())
        }
    }

    struct Unused;

    #[async_trait]
    impl ClassificationModel for Unused {
        fn name(&self) -> &str {
            "unused"
        }

        async fn classify(&self, _text: &str) -> Result<RawClassification> {
            Ok(RawClassification {
                label: RawLabel::Code(0),
                confidence: 0.0,
            })
        }
    }

    #[async_trait]
    impl SummarizationModel for Unused {
        fn name(&self) -> &str {
            "unused"
        }

        async fn summarize(&self, _title: &str, _body: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    fn orchestrator(config: PipelineConfig) -> PipelineOrchestrator {
        PipelineOrchestrator::new(config, Arc::new(EmptySource), Arc::new(Unused), Arc::new(Unused))
    }

    #[test]
    fn test_resolve_companies() {
        let o = orchestrator(PipelineConfig::default());
        assert_eq!(o.resolve_companies(&[]).len(), 9);
        assert_eq!(o.resolve_companies(&["  ".to_string()]).len(), 9);

        let given = vec![" 넷마블 ".to_string(), "컴투스".to_string(), "넷마블".to_string()];
        assert_eq!(o.resolve_companies(&given), vec!["넷마블", "컴투스"]);
    }

    #[tokio::test]
    async fn test_empty_source_is_a_successful_run() {
        let o = orchestrator(PipelineConfig::default());
        let result = o.run(&["넷마블".to_string()]).await;
        assert_eq!(result.status, RunStatus::Success);
        assert_eq!(result.message, "no articles collected");
        assert_eq!(result.companies_processed, vec!["넷마블"]);
        assert!(result.counts_are_monotone());
    }

    #[tokio::test]
    async fn test_no_companies_at_all_is_an_error() {
        let config = PipelineConfig {
            default_companies: Vec::new(),
            ..PipelineConfig::default()
        };
        let result = orchestrator(config).run(&[]).await;
        assert_eq!(result.status, RunStatus::Error);
        assert_eq!(result.diagnostics[0].kind, "config");
    }

    #[test]
    fn test_summary_message_names_empty_stage() {
        let mut result = PipelineRunResult::failed("", Vec::new());
        result.total_collected = 10;
        result.after_keyword_filter = 4;
        result.after_deduplication = 4;
        assert_eq!(summary_message(&result), "no articles classified as important");

        result.after_classification = 2;
        result.final_summaries = 2;
        assert_eq!(summary_message(&result), "pipeline completed with 2 issues");

        result.truncated = true;
        assert!(summary_message(&result).ends_with("(run deadline exceeded, partial result)"));
    }
}
