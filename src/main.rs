use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use microcosm_theme_digest::config::Config;
use microcosm_theme_digest::run::{run, RunOptions, RunOutcome};

/// Track a weekly photo-theme thread and republish a digest of qualifying posts.
#[derive(Parser)]
#[command(name = "microcosm-theme-digest")]
struct Cli {
    /// Rewind to the previous run's state before syncing.
    #[arg(short, long)]
    rewind: bool,

    /// Don't save any state changes.
    #[arg(short = 'n', long)]
    no_save: bool,

    /// Publish the composed digest when the run is flawless.
    #[arg(short, long)]
    publish: bool,
}

#[tokio::main]
async fn main() {
    match execute().await {
        Ok(outcome) if outcome.is_success() => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            error!("Fatal error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn execute() -> Result<RunOutcome> {
    let cli = Cli::parse();

    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    init_tracing()?;

    info!("Starting microcosm-theme-digest");

    // Load and validate configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        api_base_url = %config.api_base_url,
        conversation_id = config.conversation_id,
        "Configuration loaded"
    );

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let options = RunOptions {
        rewind: cli.rewind,
        no_save: cli.no_save,
        publish: cli.publish,
    };

    let outcome = run(&client, &config, options).await?;
    Ok(outcome)
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,microcosm_theme_digest=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        // Pretty-printed logging for development
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
