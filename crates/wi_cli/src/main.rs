use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wi_core::{config::parse_duration, defaults::DEFAULT_COMPANIES, PipelineConfig, RunStatus};
use wi_inference::create_models;
use wi_pipeline::PipelineOrchestrator;
use wi_sources::{create_source, HtmlBodyFetcher};
use wi_web::{create_app, AppState};

/// A duration such as `30s`, `500ms`, `5m` or `1h15m30s`; bare numbers are seconds.
#[derive(Debug, Clone)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_duration(s).map(HumanDuration).map_err(|e| e.to_string())
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Weekly issue pipeline for game-company news", long_about = None)]
struct Cli {
    /// Article source: `naver` or `fixture:<path>`
    #[arg(long, default_value = "naver")]
    source: String,
    #[arg(long, default_value = "http", help = "Model backend for classification and summarization. Available: http (default), dummy")]
    model: String,
    /// Download article pages for full text before classification
    #[arg(long)]
    fetch_bodies: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the /issue HTTP API
    Serve {
        #[arg(long, default_value = "0.0.0.0:8000")]
        addr: String,
    },
    /// Run the pipeline and print the result as JSON
    Run {
        /// Companies to process; the default list when omitted
        companies: Vec<String>,
        /// Overall run deadline (e.g. 90s, 5m); 0 disables it
        #[arg(long)]
        deadline: Option<HumanDuration>,
        /// Run in periodic mode with the specified interval (e.g. 1h, 30m, 1d, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// List the default companies
    Companies,
}

async fn build_orchestrator(cli: &Cli, config: PipelineConfig) -> anyhow::Result<PipelineOrchestrator> {
    let source = create_source(&cli.source, &config).await?;
    info!("📰 Article source initialized (using {})", cli.source);

    let (classifier, summarizer) = create_models(&cli.model, &config)?;
    info!("🧠 Models initialized (using {})", cli.model);

    let fetch_bodies = config.fetch_article_bodies;
    let timeout = config.request_timeout;
    let mut orchestrator = PipelineOrchestrator::new(config, source, classifier, summarizer);
    if fetch_bodies {
        orchestrator = orchestrator.with_body_fetcher(Arc::new(HtmlBodyFetcher::new(timeout)?));
        info!("📄 Article bodies will be fetched before classification");
    }
    Ok(orchestrator)
}

fn print_result(result: &wi_core::PipelineRunResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    if let Commands::Companies = cli.command {
        for company in DEFAULT_COMPANIES {
            println!("{}", company);
        }
        return Ok(());
    }

    let mut config = PipelineConfig::from_env()?;
    config.fetch_article_bodies |= cli.fetch_bodies;
    if let Commands::Run {
        deadline: Some(deadline),
        ..
    } = &cli.command
    {
        config.run_deadline = (!deadline.0.is_zero()).then_some(deadline.0);
    }
    config.validate()?;
    config.log_summary();

    let orchestrator = build_orchestrator(&cli, config).await?;

    match cli.command {
        Commands::Serve { addr } => {
            let app = create_app(AppState::new(orchestrator)).await;
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("🌐 Listening on {}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Run {
            companies,
            interval,
            ..
        } => {
            if let Some(interval) = interval {
                info!("⏲️ Running in periodic mode with {}s interval", interval.0.as_secs());
                loop {
                    info!("Starting pipeline cycle");
                    let result = orchestrator.run(&companies).await;
                    if let Err(e) = print_result(&result) {
                        warn!("Failed to print run result: {}", e);
                    }
                    info!("Waiting {}s before next cycle", interval.0.as_secs());
                    tokio::time::sleep(interval.0).await;
                }
            }

            let result = orchestrator.run(&companies).await;
            print_result(&result)?;
            if result.status == RunStatus::Error {
                anyhow::bail!("{}", result.message);
            }
        }
        Commands::Companies => {}
    }

    Ok(())
}
