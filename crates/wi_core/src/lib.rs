pub mod config;
pub mod defaults;
pub mod error;
pub mod models;
pub mod types;

pub use config::{PipelineConfig, RetryConfig};
pub use error::{Error, Result};
pub use models::{ArticleSource, BodyFetcher, ClassificationModel, SummarizationModel};
pub use types::{
    Article, ClassificationOutcome, Diagnostic, DiagnosticScope, FilterOutcome, IssueResult,
    Label, PipelineRunResult, RawClassification, RawLabel, RunStatus, SummaryKind,
    SummaryOutcome,
};

pub mod prelude {
    pub use crate::{Article, Error, PipelineConfig, Result};
    pub use crate::models::{ArticleSource, BodyFetcher, ClassificationModel, SummarizationModel};
}
