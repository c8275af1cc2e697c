use anyhow::Result;
use clap::Parser;
use emotion_core::config::{DEFAULT_DATASET, DEFAULT_SPLIT};
use emotion_core::loader::{save_snapshot, SnapshotPaths};
use emotion_core::DatasetSource;
use emotion_hub::{HubClient, DEFAULT_ENDPOINT};
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "emotion-fetch")]
#[command(about = "Download a labeled dataset split into a local snapshot")]
struct Cli {
    /// Dataset id on the hub
    #[arg(long, env = "HF_DATASET", default_value = DEFAULT_DATASET)]
    dataset: String,
    /// Split to download
    #[arg(long, env = "HF_SPLIT", default_value = DEFAULT_SPLIT)]
    split: String,
    /// datasets-server config (defaults to the first one listed)
    #[arg(long, env = "HF_CONFIG")]
    config: Option<String>,
    /// Access token for gated or private datasets
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// datasets-server base URL
    #[arg(long, env = "HF_DATASETS_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    /// Output snapshot directory
    #[arg(long, default_value = "./data")]
    output: String,
    /// Concurrent page requests
    #[arg(long, default_value_t = 8)]
    concurrency: usize,
    /// Request timeout seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let source = DatasetSource::new(cli.dataset, cli.split)
        .with_config(cli.config)
        .with_token(cli.token);
    let hub = HubClient::new(&cli.endpoint, Duration::from_secs(cli.timeout_secs))?
        .with_concurrency(cli.concurrency);

    let (corpus, config) = hub.fetch(&source).await?;
    save_snapshot(&SnapshotPaths::new(&cli.output), &corpus, Some(&config))?;

    tracing::info!(
        output = %cli.output,
        rows = corpus.len(),
        labels = corpus.labels.len(),
        "snapshot written"
    );
    Ok(())
}
