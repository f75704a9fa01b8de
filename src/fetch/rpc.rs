//! Chain JSON-RPC: recent performance samples.

use super::MetricFetcher;
use crate::error::{PulseError, Upstream};
use crate::models::NetworkPerformance;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Vec<PerformanceSample>>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PerformanceSample {
    num_slots: u64,
    sample_period_secs: f64,
}

impl MetricFetcher {
    /// Average slot duration over the most recent performance samples.
    pub async fn fetch_performance(&self) -> Result<NetworkPerformance, PulseError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getRecentPerformanceSamples",
            "params": [self.config().performance_samples],
        });

        let request = self.http_client.post(&self.config().rpc_url).json(&payload);
        let body = self.send_json(Upstream::Rpc, request).await?;
        parse_performance_samples(body)
    }
}

/// Mean of `samplePeriodSecs * 1000 / numSlots` across samples.
pub fn parse_performance_samples(body: Value) -> Result<NetworkPerformance, PulseError> {
    let upstream = Upstream::Rpc;
    let response: RpcResponse = serde_json::from_value(body)
        .map_err(|e| PulseError::data_shape(upstream, format!("unexpected body: {}", e)))?;

    if let Some(error) = response.error {
        return Err(PulseError::unavailable(upstream, error.message));
    }

    // A zero-slot sample has no defined slot time.
    let slot_times: Vec<f64> = response
        .result
        .unwrap_or_default()
        .iter()
        .filter(|s| s.num_slots > 0)
        .map(|s| s.sample_period_secs * 1000.0 / s.num_slots as f64)
        .collect();

    if slot_times.is_empty() {
        return Err(PulseError::data_shape(upstream, "no performance samples"));
    }

    let avg_slot_ms = slot_times.iter().sum::<f64>() / slot_times.len() as f64;
    Ok(NetworkPerformance { avg_slot_ms })
}
