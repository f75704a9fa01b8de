//! Error taxonomy for the pulse pipeline.
//!
//! Only [`PulseError::Configuration`] ever leaves the pipeline. The other two
//! variants are produced by fetchers and absorbed into placeholder cards.

use std::fmt;
use thiserror::Error;

/// The upstream service a fetcher talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upstream {
    /// Analytics query service (weekly activity and TVL rows).
    Analytics,
    /// Fee aggregator (24h vs previous 24h).
    Fees,
    /// Protocol listing aggregator.
    Protocols,
    /// Chain JSON-RPC node.
    Rpc,
}

impl Upstream {
    /// Provider name shown on placeholder cards.
    pub fn provider(&self) -> &'static str {
        match self {
            Upstream::Analytics => "Dune",
            Upstream::Fees | Upstream::Protocols => "DeFi Llama",
            Upstream::Rpc => "RPC",
        }
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Upstream::Analytics => write!(f, "analytics"),
            Upstream::Fees => write!(f, "fees"),
            Upstream::Protocols => write!(f, "protocols"),
            Upstream::Rpc => write!(f, "rpc"),
        }
    }
}

/// Errors raised while producing a snapshot.
#[derive(Debug, Error)]
pub enum PulseError {
    /// A required setting (usually the analytics credential) is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network failure, non-success status, timeout, or an empty payload.
    #[error("{upstream} unavailable: {reason}")]
    Unavailable { upstream: Upstream, reason: String },

    /// The payload parsed but a required value was zero, missing, or not a number.
    #[error("{upstream} returned unusable data: {reason}")]
    DataShape { upstream: Upstream, reason: String },
}

impl PulseError {
    pub fn unavailable(upstream: Upstream, reason: impl Into<String>) -> Self {
        PulseError::Unavailable {
            upstream,
            reason: reason.into(),
        }
    }

    pub fn data_shape(upstream: Upstream, reason: impl Into<String>) -> Self {
        PulseError::DataShape {
            upstream,
            reason: reason.into(),
        }
    }

    /// Map a transport error from `reqwest`, keeping timeouts recognisable in logs.
    pub fn from_http(upstream: Upstream, err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("cannot connect: {}", err)
        } else if err.is_decode() {
            format!("invalid response body: {}", err)
        } else {
            err.to_string()
        };
        PulseError::unavailable(upstream, reason)
    }
}
