use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use wi_core::PipelineRunResult;

use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub companies: Option<Vec<String>>,
}

impl RunRequest {
    /// An absent or blank body means "use the defaults".
    fn from_body(body: &[u8]) -> serde_json::Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }
}

pub async fn run_news(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = match RunRequest::from_body(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("📥 Rejecting malformed /issue/news body: {}", e);
            let error = json!({ "status": "error", "message": format!("invalid request body: {}", e) });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(error)).into_response();
        }
    };
    let companies = request.companies.unwrap_or_default();
    info!("📥 /issue/news requested for {} companies", companies.len());
    Json(state.orchestrator.run(&companies).await).into_response()
}

pub async fn run_news_all(State(state): State<Arc<AppState>>) -> Json<PipelineRunResult> {
    info!("📥 /issue/news-all requested");
    Json(state.orchestrator.run(&[]).await)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "issue_analysis" }))
}

pub async fn service_info(State(state): State<Arc<AppState>>) -> Json<Value> {
    let config = state.orchestrator.config();
    Json(json!({
        "service": "issue_analysis",
        "version": env!("CARGO_PKG_VERSION"),
        "source": state.orchestrator.source_name(),
        "default_companies": config.default_companies,
        "endpoints": {
            "run": "POST /issue/news",
            "run_all": "POST /issue/news-all",
            "health": "GET /issue/health",
        },
        "pipeline_stages": [
            "collection",
            "deduplication",
            "keyword_filter",
            "title_similarity",
            "classification",
            "summarization",
        ],
    }))
}
