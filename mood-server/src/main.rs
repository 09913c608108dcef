use std::sync::Arc;

use clap::Parser;
use mood_core::{db, MoodConfig, OnnxClassifierConfig, OnnxSentimentClassifier};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "mood.toml")]
    config: String,

    /// Check the store and model files, then exit
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match MoodConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging: RUST_LOG wins over service.log_level
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level)),
        )
        .init();

    let model_config = OnnxClassifierConfig::from_model_config(&config.model);

    if args.health {
        run_health_check(&config, &model_config).await;
        return Ok(());
    }

    // Prepare the store
    match db::ensure_database(&config.database).await {
        Ok(status) => tracing::info!(?status, path = %config.database.path.display(), "Sentiment store ready"),
        Err(e) => {
            eprintln!("Failed to prepare sentiment store: {}", e);
            std::process::exit(1);
        }
    }

    // Load the model once; it is shared read-only by every request
    let classifier = match OnnxSentimentClassifier::new(model_config) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("Failed to load sentiment model: {}", e);
            std::process::exit(1);
        }
    };

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    mood_server::http::start_http_server(config, classifier, tx.subscribe()).await
}

async fn run_health_check(config: &MoodConfig, model: &OnnxClassifierConfig) {
    let store = &config.database.path;
    match db::probe(store).await {
        Ok(()) => {
            let records = db::count_sentiments(store).await.unwrap_or_default();
            println!("✅ Sentiment store readable: {} ({} records)", store.display(), records);
        }
        Err(e) => {
            println!("❌ Sentiment store check failed for {}: {}", store.display(), e);
            std::process::exit(1);
        }
    }

    for (what, path) in [("ONNX model", &model.model_path), ("Tokenizer", &model.tokenizer_path)] {
        if path.exists() {
            println!("✅ {} found: {}", what, path.display());
        } else {
            println!("❌ {} missing: {}", what, path.display());
            std::process::exit(1);
        }
    }

    println!("✅ Mood Analyzer health check passed");
}
