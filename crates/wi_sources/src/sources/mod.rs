use std::sync::Arc;

use wi_core::{ArticleSource, Error, PipelineConfig, Result};

pub mod fixture;
pub mod naver;

pub use fixture::FixtureSource;
pub use naver::NaverNewsSource;

/// Build the article source named on the command line.
///
/// `naver` talks to the live API; `fixture:<path>` serves a JSON file.
pub async fn create_source(name: &str, config: &PipelineConfig) -> Result<Arc<dyn ArticleSource>> {
    match name.split_once(':') {
        None if name == "naver" => Ok(Arc::new(NaverNewsSource::from_config(config)?)),
        Some(("fixture", path)) => Ok(Arc::new(FixtureSource::from_path(path).await?)),
        _ => Err(Error::Config(format!(
            "Unknown article source: {} (expected naver or fixture:<path>)",
            name
        ))),
    }
}
