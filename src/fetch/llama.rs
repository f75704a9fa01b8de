//! DeFi aggregator: daily fee summary and the protocol listing.

use super::MetricFetcher;
use crate::error::{PulseError, Upstream};
use crate::models::{coerce_f64, MetricSample, TopProtocol};
use serde_json::Value;
use tracing::debug;

/// Minimum 1-day TVL change (percent) for a protocol to be highlighted.
pub const MIN_PROTOCOL_CHANGE: f64 = 5.0;

/// Minimum TVL (USD) for a protocol to be considered at all.
pub const MIN_PROTOCOL_TVL: f64 = 1_000_000.0;

impl MetricFetcher {
    /// Fetch fees for the last 24h and the 24h before.
    pub async fn fetch_fees(&self) -> Result<MetricSample, PulseError> {
        let request = self.http_client.get(&self.config().fees_url);
        let body = self.send_json(Upstream::Fees, request).await?;
        parse_fee_summary(&body)
    }

    /// Fetch the protocol listing and pick the top mover on the configured chain.
    ///
    /// `Ok(None)` means the listing was fetched but nothing qualified.
    pub async fn fetch_top_protocol(&self) -> Result<Option<TopProtocol>, PulseError> {
        let request = self.http_client.get(&self.config().protocols_url);
        let body = self.send_json(Upstream::Protocols, request).await?;

        let entries = body.as_array().ok_or_else(|| {
            PulseError::data_shape(Upstream::Protocols, "listing is not an array")
        })?;
        debug!("Protocol listing has {} entries", entries.len());

        Ok(select_top_protocol(entries, &self.config().chain))
    }
}

/// Read `{ total24h, total48hto24h }`. Zero or missing totals are unusable.
pub fn parse_fee_summary(body: &Value) -> Result<MetricSample, PulseError> {
    let upstream = Upstream::Fees;
    let today = body.get("total24h").and_then(coerce_f64).unwrap_or(0.0);
    let yesterday = body.get("total48hto24h").and_then(coerce_f64).unwrap_or(0.0);

    if today == 0.0 || yesterday == 0.0 {
        return Err(PulseError::data_shape(
            upstream,
            format!("incomplete fee totals (24h={}, prev 24h={})", today, yesterday),
        ));
    }

    Ok(MetricSample {
        value: today,
        previous: yesterday,
    })
}

/// Filter to protocols on `chain` above both floors, highest 1-day change first.
pub fn select_top_protocol(entries: &[Value], chain: &str) -> Option<TopProtocol> {
    let mut candidates: Vec<TopProtocol> = entries
        .iter()
        .filter(|entry| on_chain(entry, chain))
        .filter_map(|entry| {
            let change_1d = entry.get("change_1d")?.as_f64()?;
            let tvl = entry.get("tvl")?.as_f64()?;
            if change_1d > MIN_PROTOCOL_CHANGE && tvl > MIN_PROTOCOL_TVL {
                Some(TopProtocol {
                    name: entry.get("name")?.as_str()?.to_string(),
                    change_1d,
                    tvl,
                })
            } else {
                None
            }
        })
        .collect();

    // Stable sort: earlier listing entries win ties.
    candidates.sort_by(|a, b| {
        b.change_1d
            .partial_cmp(&a.change_1d)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.into_iter().next()
}

fn on_chain(entry: &Value, chain: &str) -> bool {
    entry
        .get("chains")
        .and_then(Value::as_array)
        .map(|chains| chains.iter().any(|c| c.as_str() == Some(chain)))
        .unwrap_or(false)
}
