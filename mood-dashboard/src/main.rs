//! mood-dashboard: terminal dashboard for the Mood Analyzer service
//!
//! # Subcommands
//! - `interactive`      : prompt for text, analyze it, redraw the dashboard (default)
//! - `analyze <text>`   : one-shot analysis with a single-entry dashboard
//! - `history [--json]` : records persisted by the server
//! - `status`           : server health

mod client;
mod render;
mod session;

use std::io::{self, BufRead, Write};
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::client::{ApiClient, DEFAULT_SERVER};
use crate::render::RenderOptions;
use crate::session::DashboardSession;

const TITLE: &str = "🌟 Mood Analyzer";
const SUBTITLE: &str = "Discover the sentiment behind your words!";
const PROMPT: &str = "Describe your experience: ";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "mood-dashboard", version, about = "Mood Analyzer terminal dashboard")]
struct Cli {
    /// Mood Analyzer HTTP server URL (overrides MOOD_API_URL env var)
    #[arg(long, env = "MOOD_API_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Give up on a request after this many seconds (default: wait forever)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Disable ANSI colors in charts and tables
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze lines typed at the prompt until `:quit`
    Interactive,

    /// Analyze a single text and print the dashboard
    Analyze {
        /// Text to classify
        text: String,
    },

    /// List the records stored by the server
    History {
        /// Print the raw JSON rows
        #[arg(long)]
        json: bool,
    },

    /// Show Mood Analyzer server status
    Status,
}

// ============================================================================
// Commands
// ============================================================================

async fn do_interactive(client: ApiClient, opts: RenderOptions) -> anyhow::Result<()> {
    let mut session = DashboardSession::new(client);

    println!("{TITLE}");
    println!("{SUBTITLE}");
    println!("Type text and press Enter. `:history` redraws the dashboard, `:quit` exits.\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{PROMPT}");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim_end_matches(['\r', '\n']);

        match text {
            ":quit" | ":q" => break,
            ":history" | ":charts" => {
                println!("{}\n", session.render(opts));
                continue;
            }
            _ => {}
        }

        let outcome = session.analyze(text).await;
        if outcome.is_failure() {
            eprintln!("{}", outcome.message());
        } else {
            println!("{}", outcome.message());
        }
        println!("\n{}\n", session.render(opts));
    }

    Ok(())
}

async fn do_analyze(client: ApiClient, text: &str, opts: RenderOptions) -> anyhow::Result<()> {
    let mut session = DashboardSession::new(client);

    let outcome = session.analyze(text).await;
    if outcome.is_failure() {
        anyhow::bail!("{}", outcome.message());
    }
    println!("{}", outcome.message());
    println!("\n{}", session.render(opts));
    Ok(())
}

async fn do_history(client: &ApiClient, json: bool, opts: RenderOptions) -> anyhow::Result<()> {
    let history = client.history().await?;

    if history.sentiments.is_empty() {
        eprintln!("No records stored on {}", client.base_url());
        return Ok(());
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&history.sentiments)?);
    } else {
        println!("{}", render::stored_table(&history.sentiments, opts.use_color));
    }
    Ok(())
}

async fn do_status(client: &ApiClient) -> anyhow::Result<()> {
    let body = client.health().await?;
    println!("Mood Analyzer: {}", body["status"].as_str().unwrap_or("unknown"));
    println!("Version:       {}", body["version"].as_str().unwrap_or("?"));
    println!("Database:      {}", body["database"].as_str().unwrap_or("?"));
    println!("Records:       {}", body["records"].as_i64().unwrap_or_default());
    println!("Model:         {}", body["model"].as_str().unwrap_or("?"));
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let opts = RenderOptions {
        use_color: !cli.no_color,
    };

    let client = match ApiClient::new(&cli.server, cli.timeout_secs.map(Duration::from_secs)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("mood-dashboard: failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => do_interactive(client, opts).await,
        Commands::Analyze { text } => do_analyze(client, &text, opts).await,
        Commands::History { json } => do_history(&client, json, opts).await,
        Commands::Status => do_status(&client).await,
    };

    if let Err(e) = result {
        eprintln!("mood-dashboard: {}", e);
        std::process::exit(1);
    }
}
