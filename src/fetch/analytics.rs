//! Analytics query service: latest result of a saved query.

use super::MetricFetcher;
use crate::error::{PulseError, Upstream};
use crate::models::AnalyticsRow;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct QueryResults {
    #[serde(default)]
    result: Option<ResultData>,
}

#[derive(Debug, Deserialize)]
struct ResultData {
    #[serde(default)]
    rows: Vec<AnalyticsRow>,
}

impl MetricFetcher {
    /// Fetch the first row of the configured query's latest result.
    pub async fn fetch_analytics(&self) -> Result<AnalyticsRow, PulseError> {
        let upstream = Upstream::Analytics;
        let config = self.config();

        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| PulseError::unavailable(upstream, "no API key configured"))?;

        let url = format!(
            "{}/query/{}/results",
            config.analytics_url.trim_end_matches('/'),
            config.query_id
        );
        debug!("Requesting analytics query {}", config.query_id);

        let request = self
            .http_client
            .get(&url)
            .header("X-Dune-API-Key", api_key)
            .query(&[("limit", "1")]);

        let body = self.send_json(upstream, request).await?;
        parse_analytics_response(body)
    }
}

/// Extract the first row from a query results body.
pub fn parse_analytics_response(body: Value) -> Result<AnalyticsRow, PulseError> {
    let upstream = Upstream::Analytics;
    let results: QueryResults = serde_json::from_value(body)
        .map_err(|e| PulseError::data_shape(upstream, format!("unexpected body: {}", e)))?;

    results
        .result
        .and_then(|data| data.rows.into_iter().next())
        .ok_or_else(|| PulseError::data_shape(upstream, "query returned no rows"))
}
