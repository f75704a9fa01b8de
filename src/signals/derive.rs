//! Per-category derivation.
//!
//! Every function here is total: given its numeric inputs it always returns
//! a card. Missing inputs are handled by the assembler with [`placeholder`].

use super::category::{Category, Rule};
use super::format::{format_delta, format_tvl, to_fixed};
use crate::error::Upstream;
use crate::models::{MetricSample, NetworkPerformance, SignalCard, SignalDirection, TopProtocol};

/// Reference slot time in milliseconds.
pub const TARGET_SLOT_MS: f64 = 400.0;

/// Classify a delta against a symmetric threshold. Bounds are exclusive.
pub fn classify(delta: f64, threshold: f64) -> SignalDirection {
    classify_between(delta, threshold, -threshold)
}

/// Classify a delta against separate upper and lower bounds. Bounds are exclusive.
pub fn classify_between(delta: f64, upper: f64, lower: f64) -> SignalDirection {
    if delta > upper {
        SignalDirection::Up
    } else if delta < lower {
        SignalDirection::Down
    } else {
        SignalDirection::Flat
    }
}

impl Category {
    /// Apply this category's rule to a delta.
    pub fn classify(&self, delta: f64) -> SignalDirection {
        match self.rule() {
            Rule::Symmetric(threshold) => classify(delta, threshold),
            Rule::Bounds { upper, lower } => classify_between(delta, upper, lower),
            Rule::Presence => SignalDirection::Up,
        }
    }

    fn card(&self, delta: f64, context: String) -> SignalCard {
        let direction = self.classify(delta);
        SignalCard::new(*self, direction, self.labels().get(direction), context)
    }
}

/// Mean of the weekly transaction and active-address changes.
pub fn network_activity(tx_change: f64, addr_change: f64) -> SignalCard {
    let delta = (tx_change + addr_change) / 2.0;
    Category::NetworkActivity.card(delta, format!("{} vs 7d avg", format_delta(delta)))
}

/// Daily TVL change.
pub fn defi_momentum(tvl_change: f64) -> SignalCard {
    Category::DefiMomentum.card(tvl_change, format!("{} TVL (24h)", format_delta(tvl_change)))
}

/// Transactions growing faster than wallets reads as rising per-wallet demand.
pub fn user_demand(tx_change: f64, addr_change: f64, tx_per_wallet: Option<f64>) -> SignalCard {
    let delta = tx_change - addr_change;
    let context = match tx_per_wallet {
        Some(ratio) => format!(
            "{} tx/wallet delta · {} tx/wallet",
            format_delta(delta),
            to_fixed(ratio, 1)
        ),
        None => format!("{} tx/wallet delta", format_delta(delta)),
    };
    Category::UserDemand.card(delta, context)
}

/// Weekly transactions per active wallet, when both counts are usable.
pub fn transactions_per_wallet(transactions: Option<f64>, addresses: Option<f64>) -> Option<f64> {
    match (transactions, addresses) {
        (Some(tx), Some(addr)) if addr > 0.0 => Some(tx / addr),
        _ => None,
    }
}

/// Fee change between the last 24h and the 24h before.
pub fn attention(fees: MetricSample) -> SignalCard {
    let delta = fees.percent_change();
    Category::Attention.card(delta, format!("{} fee delta (24h)", format_delta(delta)))
}

/// Highlight the top qualifying protocol, or report that none stands out.
pub fn protocol_highlight(top: Option<&TopProtocol>) -> SignalCard {
    let category = Category::ProtocolHighlight;
    let labels = category.labels();
    match top {
        Some(protocol) => SignalCard::new(
            category,
            category.classify(protocol.change_1d),
            format!("{} {}", protocol.name, labels.up),
            format!(
                "{} TVL (24h) · {}",
                format_delta(protocol.change_1d),
                format_tvl(protocol.tvl)
            ),
        ),
        None => SignalCard::new(
            category,
            SignalDirection::Flat,
            labels.flat,
            "No anomalous growth",
        ),
    }
}

/// Slot-time drift from the 400ms target.
pub fn stability(performance: NetworkPerformance) -> SignalCard {
    let drift = (performance.avg_slot_ms - TARGET_SLOT_MS) / TARGET_SLOT_MS * 100.0;
    Category::Stability.card(
        drift,
        format!(
            "{}ms avg slot ({}ms target)",
            to_fixed(performance.avg_slot_ms, 0),
            TARGET_SLOT_MS
        ),
    )
}

/// Stand-in card for a category whose upstream data is missing.
pub fn placeholder(category: Category, upstream: Upstream) -> SignalCard {
    SignalCard::new(
        category,
        SignalDirection::Flat,
        "No data",
        format!("{} unavailable", upstream.provider()),
    )
}
