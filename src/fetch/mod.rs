//! Metric fetchers.
//!
//! One [`MetricFetcher`] holds the shared HTTP client; each upstream gets its
//! own `fetch_*` method plus a pure `parse_*` function for the response body.

pub mod analytics;
pub mod llama;
pub mod rpc;

use crate::config::Config;
use crate::error::{PulseError, Upstream};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Endpoints and limits used by the fetchers.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub analytics_url: String,
    pub query_id: u64,
    pub api_key: Option<String>,
    pub fees_url: String,
    pub protocols_url: String,
    pub rpc_url: String,
    pub chain: String,
    pub performance_samples: usize,
    pub timeout_seconds: u64,
}

impl From<&Config> for FetchConfig {
    fn from(config: &Config) -> Self {
        Self {
            analytics_url: config.analytics.base_url.clone(),
            query_id: config.analytics.query_id,
            api_key: config
                .analytics
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            fees_url: config.sources.fees_url.clone(),
            protocols_url: config.sources.protocols_url.clone(),
            rpc_url: config.sources.rpc_url.clone(),
            chain: config.sources.chain.clone(),
            performance_samples: config.sources.performance_samples,
            timeout_seconds: config.sources.timeout_seconds,
        }
    }
}

/// Issues requests against the four upstream services.
#[derive(Debug, Clone)]
pub struct MetricFetcher {
    config: FetchConfig,
    http_client: reqwest::Client,
}

impl MetricFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, PulseError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("solpulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PulseError::Configuration(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Send a request and decode a JSON body, treating any non-2xx status as unavailable.
    async fn send_json(
        &self,
        upstream: Upstream,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, PulseError> {
        let response = request
            .send()
            .await
            .map_err(|e| PulseError::from_http(upstream, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PulseError::unavailable(
                upstream,
                format!("HTTP status {}", status),
            ));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| PulseError::from_http(upstream, e))?;
        debug!("{} responded with {}", upstream, status);

        Ok(body)
    }
}
