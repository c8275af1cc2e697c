use anyhow::Result;
use clap::{Parser, Subcommand};
use emotion_core::engine::DEFAULT_SEARCH_LIMIT;
use emotion_core::{CorpusLoader, QueryEngine, SeededRandom, SnapshotLoader};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "emotion-query")]
#[command(about = "Query a local emotion corpus snapshot", long_about = None)]
struct Cli {
    /// Snapshot directory written by emotion-fetch
    #[arg(long, env = "EMOTION_DATA", default_value = "./data")]
    data: String,
    /// Seed for reproducible samples
    #[arg(long)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw n random rows
    Sample {
        #[arg(allow_negative_numbers = true)]
        n: i64,
    },
    /// Count rows labeled with an emotion
    Count { emotion: String },
    /// Case-insensitive substring search
    Search {
        query: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT, allow_negative_numbers = true)]
        limit: i64,
    },
    /// Count and percentage per emotion
    Stats,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let corpus = Arc::new(SnapshotLoader::new(&cli.data).load()?);
    tracing::info!(
        data = %cli.data,
        rows = corpus.len(),
        labels = corpus.labels.len(),
        "corpus ready"
    );
    let engine = match cli.seed {
        Some(seed) => QueryEngine::with_random(corpus, SeededRandom::new(seed)),
        None => QueryEngine::new(corpus),
    };

    match cli.command {
        Commands::Sample { n } => print_json(&engine.sample(n)),
        Commands::Count { emotion } => print_json(&engine.count_by_emotion(&emotion)),
        Commands::Search { query, limit } => print_json(&engine.search_text(&query, limit)),
        Commands::Stats => print_json(&engine.distribution_analysis()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
