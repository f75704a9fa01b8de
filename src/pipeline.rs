//! Snapshot assembly.
//!
//! Fires all four fetchers at once, waits for every one of them to settle,
//! then derives one card per category. A failed fetch only ever turns its
//! own categories into placeholder cards.

use crate::config::Config;
use crate::error::{PulseError, Upstream};
use crate::fetch::{FetchConfig, MetricFetcher};
use crate::models::{
    AnalyticsRow, MetricSample, NetworkPerformance, PulseSnapshot, SignalCard, TopProtocol,
};
use crate::signals::{self, Category};
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

/// Settled outcome of every fetcher for one run.
#[derive(Debug)]
pub struct FetchResults {
    pub analytics: Result<AnalyticsRow, PulseError>,
    pub fees: Result<MetricSample, PulseError>,
    pub top_protocol: Result<Option<TopProtocol>, PulseError>,
    pub performance: Result<NetworkPerformance, PulseError>,
}

/// Produces pulse snapshots from the configured upstreams.
#[derive(Debug, Clone)]
pub struct Pipeline {
    fetcher: MetricFetcher,
    require_credential: bool,
}

impl Pipeline {
    pub fn new(config: &Config) -> Result<Self, PulseError> {
        let fetcher = MetricFetcher::new(FetchConfig::from(config))?;
        Ok(Self {
            fetcher,
            require_credential: config.analytics.required,
        })
    }

    /// Produce the current snapshot.
    ///
    /// Upstream failures never fail this call; only a missing required
    /// credential does, and it is checked before any request is made.
    pub async fn produce_snapshot(&self) -> Result<PulseSnapshot, PulseError> {
        if self.require_credential && self.fetcher.config().api_key.is_none() {
            return Err(PulseError::Configuration(
                "DUNE_API_KEY not configured".to_string(),
            ));
        }

        let results = self.fetch_all().await;
        Ok(assemble(&results, Utc::now().date_naive()))
    }

    /// Run all fetchers concurrently and wait for every one to settle.
    pub async fn fetch_all(&self) -> FetchResults {
        let (analytics, fees, top_protocol, performance) = futures::join!(
            self.fetcher.fetch_analytics(),
            self.fetcher.fetch_fees(),
            self.fetcher.fetch_top_protocol(),
            self.fetcher.fetch_performance(),
        );

        for err in [
            analytics.as_ref().err(),
            fees.as_ref().err(),
            top_protocol.as_ref().err(),
            performance.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        {
            warn!("{}", err);
        }

        FetchResults {
            analytics,
            fees,
            top_protocol,
            performance,
        }
    }
}

/// Build a snapshot from settled fetch results. Depends only on its inputs.
pub fn assemble(results: &FetchResults, date: NaiveDate) -> PulseSnapshot {
    PulseSnapshot::new(date, Category::ALL.map(|category| derive_card(category, results)))
}

fn derive_card(category: Category, results: &FetchResults) -> SignalCard {
    match derive_signal(category, results) {
        Some(card) => {
            info!(
                "✓ {}: {} ({})",
                card.title,
                card.direction,
                card.context.as_deref().unwrap_or("no context")
            );
            card
        }
        None => {
            let upstream = upstream_for(category);
            info!("✗ {}: no data ({} unavailable)", category.title(), upstream);
            signals::placeholder(category, upstream)
        }
    }
}

/// The derived card, or `None` when its inputs did not arrive.
fn derive_signal(category: Category, results: &FetchResults) -> Option<SignalCard> {
    let row = results.analytics.as_ref().ok();

    match category {
        Category::NetworkActivity => row.and_then(|r| {
            Some(signals::network_activity(
                r.weekly_transactions_change?,
                r.weekly_active_addresses_change?,
            ))
        }),
        Category::DefiMomentum => {
            row.and_then(|r| Some(signals::defi_momentum(r.daily_tvl_usd_change?)))
        }
        Category::UserDemand => row.and_then(|r| {
            Some(signals::user_demand(
                r.weekly_transactions_change?,
                r.weekly_active_addresses_change?,
                signals::transactions_per_wallet(
                    r.weekly_transactions,
                    r.weekly_active_addresses,
                ),
            ))
        }),
        Category::Attention => results.fees.as_ref().ok().map(|f| signals::attention(*f)),
        Category::ProtocolHighlight => results
            .top_protocol
            .as_ref()
            .ok()
            .map(|top| signals::protocol_highlight(top.as_ref())),
        Category::Stability => results
            .performance
            .as_ref()
            .ok()
            .map(|p| signals::stability(*p)),
    }
}

/// Which upstream a category's inputs come from.
pub fn upstream_for(category: Category) -> Upstream {
    match category {
        Category::NetworkActivity | Category::DefiMomentum | Category::UserDemand => {
            Upstream::Analytics
        }
        Category::Attention => Upstream::Fees,
        Category::ProtocolHighlight => Upstream::Protocols,
        Category::Stability => Upstream::Rpc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SignalDirection;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    fn weekly_row() -> AnalyticsRow {
        AnalyticsRow {
            weekly_transactions: Some(350_000_000.0),
            weekly_active_addresses: Some(10_000_000.0),
            weekly_transactions_change: Some(8.0),
            weekly_active_addresses_change: Some(4.0),
            daily_tvl_usd_change: Some(3.0),
            daily_tvl_usd: Some(9.1e9),
        }
    }

    fn all_ok() -> FetchResults {
        FetchResults {
            analytics: Ok(weekly_row()),
            fees: Ok(MetricSample {
                value: 5_600_000.0,
                previous: 5_000_000.0,
            }),
            top_protocol: Ok(Some(TopProtocol {
                name: "Jupiter".to_string(),
                change_1d: 12.0,
                tvl: 2_000_000.0,
            })),
            performance: Ok(NetworkPerformance { avg_slot_ms: 460.0 }),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn ids(snapshot: &PulseSnapshot) -> Vec<&'static str> {
        snapshot.signals().iter().map(|c| c.id.id()).collect()
    }

    const EXPECTED_IDS: [&str; 6] = [
        "network-activity",
        "defi-momentum",
        "user-demand",
        "attention",
        "protocol-highlight",
        "stability",
    ];

    #[test]
    fn test_assemble_all_sources() {
        let snapshot = assemble(&all_ok(), date());
        assert_eq!(ids(&snapshot), EXPECTED_IDS);

        let network = snapshot.card(Category::NetworkActivity);
        assert_eq!(network.direction, SignalDirection::Up);
        assert_eq!(network.context.as_deref(), Some("+6.0% vs 7d avg"));

        assert_eq!(
            snapshot.card(Category::UserDemand).direction,
            SignalDirection::Flat
        );
        assert_eq!(
            snapshot.card(Category::UserDemand).context.as_deref(),
            Some("+4.0% tx/wallet delta · 35.0 tx/wallet")
        );
        assert_eq!(
            snapshot.card(Category::Attention).state_label,
            "Fee spike"
        );
        assert_eq!(
            snapshot.card(Category::ProtocolHighlight).state_label,
            "Jupiter surging"
        );
        assert_eq!(snapshot.card(Category::Stability).state_label, "Congested");
    }

    #[test]
    fn test_all_sources_failed() {
        let results = FetchResults {
            analytics: Err(PulseError::unavailable(Upstream::Analytics, "down")),
            fees: Err(PulseError::unavailable(Upstream::Fees, "down")),
            top_protocol: Err(PulseError::unavailable(Upstream::Protocols, "down")),
            performance: Err(PulseError::unavailable(Upstream::Rpc, "down")),
        };

        let snapshot = assemble(&results, date());
        assert_eq!(ids(&snapshot), EXPECTED_IDS);
        for card in snapshot.signals() {
            assert_eq!(card.direction, SignalDirection::Flat);
            assert_eq!(card.state_label, "No data");
        }
        assert_eq!(
            snapshot.card(Category::Stability).context.as_deref(),
            Some("RPC unavailable")
        );
        assert_eq!(
            snapshot.card(Category::DefiMomentum).context.as_deref(),
            Some("Dune unavailable")
        );
    }

    #[test]
    fn test_each_failure_only_degrades_its_own_categories() {
        let baseline = assemble(&all_ok(), date());

        for upstream in [
            Upstream::Analytics,
            Upstream::Fees,
            Upstream::Protocols,
            Upstream::Rpc,
        ] {
            let mut results = all_ok();
            let err = PulseError::unavailable(upstream, "down");
            match upstream {
                Upstream::Analytics => results.analytics = Err(err),
                Upstream::Fees => results.fees = Err(err),
                Upstream::Protocols => results.top_protocol = Err(err),
                Upstream::Rpc => results.performance = Err(err),
            }
            let degraded = assemble(&results, date());

            let mut placeholders = 0;
            for category in Category::ALL {
                if upstream_for(category) == upstream {
                    assert_eq!(
                        degraded.card(category),
                        &signals::placeholder(category, upstream)
                    );
                    placeholders += 1;
                } else {
                    assert_eq!(degraded.card(category), baseline.card(category));
                }
            }

            let expected = if upstream == Upstream::Analytics { 3 } else { 1 };
            assert_eq!(placeholders, expected, "{} failure", upstream);
        }
    }

    #[test]
    fn test_unparsable_column_only_disables_dependent_card() {
        let mut results = all_ok();
        if let Ok(row) = results.analytics.as_mut() {
            row.daily_tvl_usd_change = None;
        }

        let snapshot = assemble(&results, date());
        assert_eq!(
            snapshot.card(Category::DefiMomentum).state_label,
            "No data"
        );
        assert_eq!(
            snapshot.card(Category::NetworkActivity).state_label,
            "Heating up"
        );
    }

    #[test]
    fn test_no_qualifying_protocol() {
        let mut results = all_ok();
        results.top_protocol = Ok(None);

        let card = assemble(&results, date())
            .card(Category::ProtocolHighlight)
            .clone();
        assert_eq!(card.direction, SignalDirection::Flat);
        assert_eq!(card.state_label, "No standout");
        assert_eq!(card.context.as_deref(), Some("No anomalous growth"));
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let results = all_ok();
        let first = serde_json::to_string(&assemble(&results, date())).unwrap();
        let second = serde_json::to_string(&assemble(&results, date())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = serde_json::to_value(assemble(&all_ok(), date())).unwrap();
        assert_eq!(json["date"], "2026-10-19");
        assert_eq!(json["signals"].as_array().map(|s| s.len()), Some(6));
        assert_eq!(json["signals"][5]["signal"], "up");
        assert_eq!(json["signals"][5]["state"], "Congested");
    }

    fn test_config(base: &str) -> Config {
        let mut config = Config::default();
        config.analytics.api_key = Some("test-key".to_string());
        config.analytics.base_url = base.to_string();
        config.sources.fees_url = format!("{}/fees", base);
        config.sources.protocols_url = format!("{}/protocols", base);
        config.sources.rpc_url = format!("{}/rpc", base);
        config.sources.timeout_seconds = 5;
        config
    }

    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_produce_snapshot_with_failing_fee_source() {
        let router = Router::new()
            .route(
                "/query/:id/results",
                get(|| async {
                    Json(json!({
                        "result": { "rows": [{
                            "weekly_transactions": 350000000,
                            "weekly_active_addresses": 10000000,
                            "weekly_transactions_change": "8",
                            "weekly_active_addresses_change": 4,
                            "daily_tvl_usd_change": 3,
                            "daily_tvl_usd": 9100000000u64
                        }]}
                    }))
                }),
            )
            .route("/fees", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .route(
                "/protocols",
                get(|| async {
                    Json(json!([
                        { "name": "Jupiter", "chains": ["Solana"], "change_1d": 12, "tvl": 2000000 },
                        { "name": "Tiny", "chains": ["Solana"], "change_1d": 30, "tvl": 500000 }
                    ]))
                }),
            )
            .route(
                "/rpc",
                post(|| async {
                    Json(json!({
                        "jsonrpc": "2.0",
                        "id": 1,
                        "result": [
                            { "numSlots": 125, "samplePeriodSecs": 57.5 },
                            { "numSlots": 125, "samplePeriodSecs": 57.5 }
                        ]
                    }))
                }),
            );

        let base = spawn_upstream(router).await;
        let pipeline = Pipeline::new(&test_config(&base)).unwrap();
        let snapshot = pipeline.produce_snapshot().await.unwrap();

        assert_eq!(ids(&snapshot), EXPECTED_IDS);
        assert_eq!(snapshot.date(), Utc::now().date_naive());

        let attention = snapshot.card(Category::Attention);
        assert_eq!(attention.state_label, "No data");
        assert_eq!(attention.context.as_deref(), Some("DeFi Llama unavailable"));

        assert_eq!(
            snapshot.card(Category::NetworkActivity).state_label,
            "Heating up"
        );
        assert_eq!(snapshot.card(Category::DefiMomentum).state_label, "Inflow");
        assert_eq!(
            snapshot.card(Category::ProtocolHighlight).context.as_deref(),
            Some("+12.0% TVL (24h) · $2M")
        );
        assert_eq!(snapshot.card(Category::Stability).state_label, "Congested");
    }

    #[tokio::test]
    async fn test_unreachable_upstreams_still_yield_six_cards() {
        let pipeline = Pipeline::new(&test_config("http://127.0.0.1:1")).unwrap();
        let snapshot = pipeline.produce_snapshot().await.unwrap();

        assert_eq!(ids(&snapshot), EXPECTED_IDS);
        assert!(snapshot
            .signals()
            .iter()
            .all(|card| card.state_label == "No data"));
    }

    #[tokio::test]
    async fn test_missing_required_key_is_configuration_error() {
        let mut config = test_config("http://127.0.0.1:1");
        config.analytics.api_key = None;

        let err = Pipeline::new(&config)
            .unwrap()
            .produce_snapshot()
            .await
            .unwrap_err();
        assert!(matches!(err, PulseError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_missing_optional_key_degrades() {
        let mut config = test_config("http://127.0.0.1:1");
        config.analytics.api_key = None;
        config.analytics.required = false;

        let snapshot = Pipeline::new(&config)
            .unwrap()
            .produce_snapshot()
            .await
            .unwrap();
        assert_eq!(
            snapshot.card(Category::NetworkActivity).state_label,
            "No data"
        );
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out_as_unavailable() {
        let router = Router::new()
            .route(
                "/query/:id/results",
                get(|| async {
                    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                    Json(json!({ "result": { "rows": [] } }))
                }),
            )
            .route(
                "/fees",
                get(|| async { Json(json!({ "total24h": 1100, "total48hto24h": 1000 })) }),
            )
            .route("/protocols", get(|| async { Json(json!([])) }))
            .route(
                "/rpc",
                post(|| async {
                    Json(json!({
                        "jsonrpc": "2.0",
                        "id": 1,
                        "result": [{ "numSlots": 100, "samplePeriodSecs": 40 }]
                    }))
                }),
            );

        let base = spawn_upstream(router).await;
        let mut config = test_config(&base);
        config.sources.timeout_seconds = 1;
        let pipeline = Pipeline::new(&config).unwrap();

        let started = std::time::Instant::now();
        let snapshot = pipeline.produce_snapshot().await.unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(10));

        for category in [
            Category::NetworkActivity,
            Category::DefiMomentum,
            Category::UserDemand,
        ] {
            let card = snapshot.card(category);
            assert_eq!(card.state_label, "No data");
            assert_eq!(card.context.as_deref(), Some("Dune unavailable"));
        }

        let attention = snapshot.card(Category::Attention);
        assert_eq!(attention.state_label, "Fee spike");
        assert_eq!(
            attention.context.as_deref(),
            Some("+10.0% fee delta (24h)")
        );
        assert_eq!(
            snapshot.card(Category::ProtocolHighlight).state_label,
            "No standout"
        );
        assert_eq!(snapshot.card(Category::Stability).state_label, "Stable");
    }
}
