//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Solana Pulse - daily directional health signals for Solana
///
/// Fetches network activity, TVL, fee, protocol and slot-time metrics,
/// classifies each as up/flat/down and publishes a six-card snapshot.
///
/// Examples:
///   solpulse
///   solpulse --json-output src/lib/pulse-data.json --markdown-output public/pulse.md
///   solpulse --stdout --allow-missing-key
///   solpulse --serve --bind 0.0.0.0:3001
///   solpulse --init-config
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// API key for the analytics query service
    #[arg(long, env = "DUNE_API_KEY", hide_env_values = true)]
    pub dune_api_key: Option<String>,

    /// Saved analytics query to read the weekly row from
    #[arg(long, value_name = "ID")]
    pub query_id: Option<u64>,

    /// Degrade analytics-backed cards to "No data" instead of failing
    /// when no API key is configured
    #[arg(long)]
    pub allow_missing_key: bool,

    /// Where to write the JSON snapshot
    #[arg(long, value_name = "FILE")]
    pub json_output: Option<PathBuf>,

    /// Where to write the markdown document
    #[arg(long, value_name = "FILE")]
    pub markdown_output: Option<PathBuf>,

    /// Print the JSON snapshot to stdout instead of writing files
    #[arg(long)]
    pub stdout: bool,

    /// Serve the snapshot over HTTP instead of running once
    #[arg(long)]
    pub serve: bool,

    /// Listen address for --serve
    #[arg(long, value_name = "ADDR", env = "SOLPULSE_BIND")]
    pub bind: Option<String>,

    /// Per-request timeout for upstream calls, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Chain name used to filter the protocol listing
    #[arg(long, value_name = "NAME")]
    pub chain: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .solpulse.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .solpulse.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.serve && self.stdout {
            return Err("Cannot use both --serve and --stdout".to_string());
        }

        if self.serve && (self.json_output.is_some() || self.markdown_output.is_some()) {
            return Err("Output paths are not used with --serve".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref chain) = self.chain {
            if chain.trim().is_empty() {
                return Err("Chain name must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
