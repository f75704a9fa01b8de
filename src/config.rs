//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.solpulse.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".solpulse.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Output and presentation settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analytics query service settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Public data sources.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Where the JSON snapshot is written.
    #[serde(default = "default_json_output")]
    pub json_output: String,

    /// Where the markdown document is written.
    #[serde(default = "default_markdown_output")]
    pub markdown_output: String,

    /// Public site linked from the markdown document.
    #[serde(default = "default_site_url")]
    pub site_url: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            json_output: default_json_output(),
            markdown_output: default_markdown_output(),
            site_url: default_site_url(),
        }
    }
}

fn default_json_output() -> String {
    "pulse-data.json".to_string()
}

fn default_markdown_output() -> String {
    "pulse.md".to_string()
}

fn default_site_url() -> String {
    "https://solanapulse.live".to_string()
}

/// Analytics query service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// API key. Usually supplied through `DUNE_API_KEY` instead of the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API base URL.
    #[serde(default = "default_analytics_url")]
    pub base_url: String,

    /// Saved query producing the weekly activity row.
    #[serde(default = "default_query_id")]
    pub query_id: u64,

    /// Treat a missing API key as a configuration error.
    /// If false, the analytics-backed cards fall back to "No data".
    #[serde(default = "default_true")]
    pub required: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_analytics_url(),
            query_id: default_query_id(),
            required: true,
        }
    }
}

fn default_analytics_url() -> String {
    "https://api.dune.com/api/v1".to_string()
}

fn default_query_id() -> u64 {
    6663338
}

fn default_true() -> bool {
    true
}

/// Public data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Daily fee summary endpoint.
    #[serde(default = "default_fees_url")]
    pub fees_url: String,

    /// Protocol listing endpoint.
    #[serde(default = "default_protocols_url")]
    pub protocols_url: String,

    /// JSON-RPC node.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Chain name as it appears in the protocol listing.
    #[serde(default = "default_chain")]
    pub chain: String,

    /// Number of performance samples requested from the node.
    #[serde(default = "default_performance_samples")]
    pub performance_samples: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            fees_url: default_fees_url(),
            protocols_url: default_protocols_url(),
            rpc_url: default_rpc_url(),
            chain: default_chain(),
            performance_samples: default_performance_samples(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_fees_url() -> String {
    "https://api.llama.fi/summary/fees/solana?dataType=dailyFees".to_string()
}

fn default_protocols_url() -> String {
    "https://api.llama.fi/protocols".to_string()
}

fn default_rpc_url() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}

fn default_chain() -> String {
    "Solana".to_string()
}

fn default_performance_samples() -> usize {
    20
}

fn default_timeout() -> u64 {
    15
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// `Cache-Control` value sent with every snapshot.
    #[serde(default = "default_cache_control")]
    pub cache_control: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cache_control: default_cache_control(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3001".to_string()
}

fn default_cache_control() -> String {
    "s-maxage=3600, stale-while-revalidate=1800".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref key) = args.dune_api_key {
            self.analytics.api_key = Some(key.clone());
        }
        if let Some(query_id) = args.query_id {
            self.analytics.query_id = query_id;
        }
        if args.allow_missing_key {
            self.analytics.required = false;
        }

        if let Some(timeout) = args.timeout {
            self.sources.timeout_seconds = timeout;
        }
        if let Some(ref chain) = args.chain {
            self.sources.chain = chain.clone();
        }

        if let Some(ref path) = args.json_output {
            self.general.json_output = path.display().to_string();
        }
        if let Some(ref path) = args.markdown_output {
            self.general.markdown_output = path.display().to_string();
        }
        if let Some(ref bind) = args.bind {
            self.server.bind = bind.clone();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
