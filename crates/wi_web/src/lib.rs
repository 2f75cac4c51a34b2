use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod handlers;
pub mod state;

pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/issue", get(handlers::service_info))
        .route("/issue/health", get(handlers::health))
        .route("/issue/news", post(handlers::run_news))
        .route("/issue/news-all", post(handlers::run_news_all))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, AppState};
    pub use wi_core::{PipelineRunResult, Result};
}
