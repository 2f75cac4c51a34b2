//! The issue pipeline: dedup, keyword filter, similar-title removal and the
//! orchestrator that sequences them with the inference gateways.

pub mod dedup;
pub mod keyword;
pub mod orchestrator;
pub mod ordered;
pub mod similarity;

pub use dedup::{deduplicate, SeenSet};
pub use keyword::KeywordFilter;
pub use orchestrator::PipelineOrchestrator;
pub use similarity::{token_set_ratio, TitleSimilarity};

pub mod prelude {
    pub use crate::orchestrator::PipelineOrchestrator;
    pub use wi_core::{PipelineConfig, PipelineRunResult, Result, RunStatus};
}
