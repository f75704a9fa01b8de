//! Solana Pulse - daily ecosystem health signals
//!
//! A CLI that fetches a handful of public Solana metrics, classifies each
//! as up/flat/down and publishes a six-card snapshot as JSON and markdown,
//! or serves it over HTTP.
//!
//! Exit codes:
//!   0 - Success (possibly with "No data" cards)
//!   1 - Configuration or runtime error

mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod pipeline;
mod report;
mod server;
mod signals;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::Pipeline;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Solana Pulse v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let result = if args.serve {
        run_server(&args).await
    } else {
        run_once(&args).await
    };

    if let Err(e) = result {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .solpulse.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Set DUNE_API_KEY in the environment rather than in the file.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults, then apply CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        Config::load(config_path)?
    } else {
        match Config::load_default() {
            Ok(Some(config)) => {
                info!("Loaded default config from {}", CONFIG_FILE);
                config
            }
            Ok(None) => {
                debug!("No config file found, using defaults");
                Config::default()
            }
            Err(e) => {
                warn!("Failed to load config: {:#}", e);
                Config::default()
            }
        }
    };

    config.merge_with_args(args);
    Ok(config)
}

/// Fetch once, then write the JSON and markdown documents (or print JSON).
async fn run_once(args: &Args) -> Result<()> {
    let start_time = Instant::now();
    let config = load_config(args)?;
    let pipeline = Pipeline::new(&config)?;

    let spinner = if args.quiet || args.stdout {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Fetching Solana Pulse data…");
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    };

    let snapshot = pipeline.produce_snapshot().await;
    spinner.finish_and_clear();
    let snapshot = snapshot?;

    let json = report::generate_json_report(&snapshot)?;

    if args.stdout {
        print!("{}", json);
        return Ok(());
    }

    let json_path = Path::new(&config.general.json_output);
    report::write_document(json_path, &json)?;

    let markdown = report::generate_markdown_report(&snapshot, &config.general.site_url)?;
    let markdown_path = Path::new(&config.general.markdown_output);
    report::write_document(markdown_path, &markdown)?;

    if !args.quiet {
        println!("\n{}", report::generate_terminal_summary(&snapshot));
        println!("\n✅ Written to {}", json_path.display());
        println!("✅ Written to {}", markdown_path.display());
        println!(
            "   Duration: {:.1}s",
            start_time.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

/// Serve snapshots over HTTP.
async fn run_server(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let pipeline = Pipeline::new(&config)?;

    let has_key = config
        .analytics
        .api_key
        .as_deref()
        .is_some_and(|key| !key.trim().is_empty());
    if config.analytics.required && !has_key {
        warn!("DUNE_API_KEY not configured; /api/pulse will return 500");
    }

    server::serve(pipeline, &config.server.bind, &config.server.cache_control).await
}
