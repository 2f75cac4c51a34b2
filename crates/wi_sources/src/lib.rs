pub mod body;
pub mod normalize;
pub mod sources;

pub use body::HtmlBodyFetcher;
pub use sources::{create_source, FixtureSource, NaverNewsSource};

pub mod prelude {
    pub use super::sources::create_source;
    pub use wi_core::{Article, ArticleSource, Error, Result};
}
