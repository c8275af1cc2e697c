use anyhow::Result;
use axum::Router;
use clap::{Parser, ValueEnum};
use emotion_core::config::{DEFAULT_DATASET, DEFAULT_SPLIT};
use emotion_core::{Corpus, CorpusLoader, DatasetSource, QueryEngine, SnapshotLoader};
use emotion_hub::{HubClient, DEFAULT_ENDPOINT};
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use server::build_app;
use server::mcp::EmotionService;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Transport {
    /// MCP over stdin/stdout
    Stdio,
    /// JSON REST routes
    Http,
}

#[derive(Parser)]
struct Args {
    /// How callers reach the tools
    #[arg(long, value_enum, env = "EMOTION_TRANSPORT", default_value_t = Transport::Stdio)]
    transport: Transport,
    /// Snapshot directory; when omitted the split is fetched from the hub
    #[arg(long, env = "EMOTION_DATA")]
    data: Option<String>,
    /// Dataset id on the hub
    #[arg(long, env = "HF_DATASET", default_value = DEFAULT_DATASET)]
    dataset: String,
    /// Split to serve
    #[arg(long, env = "HF_SPLIT", default_value = DEFAULT_SPLIT)]
    split: String,
    /// datasets-server config
    #[arg(long, env = "HF_CONFIG")]
    config: Option<String>,
    /// Access token for gated or private datasets
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// datasets-server base URL
    #[arg(long, env = "HF_DATASETS_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    /// Host to bind (http transport)
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind (http transport)
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP protocol, so logs go to stderr
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let args = Args::parse();

    // No query is served unless the corpus loads.
    let corpus = load_corpus(&args).await?;
    let engine = QueryEngine::new(Arc::new(corpus));

    match args.transport {
        Transport::Stdio => serve_stdio(engine).await,
        Transport::Http => serve_http(engine, &args.host, args.port).await,
    }
}

async fn serve_stdio(engine: QueryEngine) -> Result<()> {
    tracing::info!("emotion MCP server on stdio");
    let server = EmotionService::new(Arc::new(engine)).serve(stdio()).await?;
    server.waiting().await?;
    tracing::info!("emotion MCP server stopped");
    Ok(())
}

async fn serve_http(engine: QueryEngine, host: &str, port: u16) -> Result<()> {
    let app: Router = build_app(engine);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn load_corpus(args: &Args) -> Result<Corpus> {
    if let Some(dir) = &args.data {
        return Ok(SnapshotLoader::new(dir).load()?);
    }
    let source = DatasetSource::new(&args.dataset, &args.split)
        .with_config(args.config.clone())
        .with_token(args.token.clone());
    tracing::info!(?source, "loading from hub");
    let hub = HubClient::new(&args.endpoint, Duration::from_secs(30))?;
    let (corpus, _config) = hub.fetch(&source).await?;
    Ok(corpus)
}
