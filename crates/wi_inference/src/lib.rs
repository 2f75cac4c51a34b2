pub mod gateway;
pub mod models;
pub mod retry;

pub use gateway::{fallback_summary, ClassificationGateway, LabelPolicy, SummarizationGateway};
pub use models::create_models;
pub use retry::RetryPolicy;

pub mod prelude {
    pub use crate::gateway::{ClassificationGateway, LabelPolicy, SummarizationGateway};
    pub use crate::models::create_models;
    pub use crate::retry::RetryPolicy;
    pub use wi_core::{Error, Result};
}
