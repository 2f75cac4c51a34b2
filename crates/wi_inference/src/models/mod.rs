use std::sync::Arc;

use wi_core::{ClassificationModel, Error, PipelineConfig, Result, SummarizationModel};

pub mod dummy;
pub mod http;

pub use dummy::{DummyClassifier, DummySummarizer};
pub use http::{HttpClassifier, HttpSummarizer};

/// Build the classifier/summarizer pair named by `kind` (`http` or `dummy`).
pub fn create_models(
    kind: &str,
    config: &PipelineConfig,
) -> Result<(Arc<dyn ClassificationModel>, Arc<dyn SummarizationModel>)> {
    match kind.to_lowercase().as_str() {
        "http" => {
            let classifier = HttpClassifier::new(&config.classifier_url, config.request_timeout)?;
            let summarizer = HttpSummarizer::new(&config.summarizer_url, config.request_timeout)?;
            Ok((Arc::new(classifier), Arc::new(summarizer)))
        }
        "dummy" => Ok((Arc::new(DummyClassifier::new()), Arc::new(DummySummarizer::new()))),
        other => Err(Error::Config(format!(
            "Unknown model backend: {} (expected http or dummy)",
            other
        ))),
    }
}
