//! Data models for the pulse pipeline.
//!
//! This module contains the signal card and snapshot types handed to
//! renderers, plus the normalized readings the fetchers produce.

use crate::signals::Category;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Coarse trend classification of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    Up,
    Flat,
    Down,
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalDirection::Up => write!(f, "up"),
            SignalDirection::Flat => write!(f, "flat"),
            SignalDirection::Down => write!(f, "down"),
        }
    }
}

impl SignalDirection {
    /// Arrow used in text and markdown output.
    pub fn arrow(&self) -> &'static str {
        match self {
            SignalDirection::Up => "↑",
            SignalDirection::Flat => "→",
            SignalDirection::Down => "↓",
        }
    }

    /// Glyph drawn on dashboard cards.
    pub fn glyph(&self) -> &'static str {
        match self {
            SignalDirection::Up => "▲",
            SignalDirection::Flat => "▬",
            SignalDirection::Down => "▼",
        }
    }

    /// Display color for the card glyph.
    pub fn color(&self) -> &'static str {
        match self {
            SignalDirection::Up => "#14F195",
            SignalDirection::Flat => "#52525B",
            SignalDirection::Down => "#F87171",
        }
    }
}

/// One labeled signal for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalCard {
    /// Stable category key, e.g. `network-activity`.
    pub id: Category,
    /// Human-readable category title.
    pub title: String,
    /// Derived direction.
    #[serde(rename = "signal")]
    pub direction: SignalDirection,
    /// Label for the direction, e.g. "Heating up".
    #[serde(rename = "state")]
    pub state_label: String,
    /// Formatted delta description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl SignalCard {
    pub fn new(
        category: Category,
        direction: SignalDirection,
        state_label: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            id: category,
            title: category.title().to_string(),
            direction,
            state_label: state_label.into(),
            context: Some(context.into()),
        }
    }
}

/// The complete result of one pipeline run: a date plus one card per category.
///
/// The card array has a fixed length and is only filled in [`Category::ALL`]
/// order by the assembler, so a snapshot never has missing or duplicate ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseSnapshot {
    date: NaiveDate,
    signals: [SignalCard; Category::COUNT],
}

impl PulseSnapshot {
    pub(crate) fn new(date: NaiveDate, signals: [SignalCard; Category::COUNT]) -> Self {
        Self { date, signals }
    }

    /// Calendar date (UTC) the snapshot was assembled.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Cards in fixed category order.
    pub fn signals(&self) -> &[SignalCard] {
        &self.signals
    }

    /// Look up the card for one category.
    #[cfg(test)]
    pub fn card(&self, category: Category) -> &SignalCard {
        &self.signals[category.index()]
    }
}

/// A reading and the reading of the previous window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSample {
    pub value: f64,
    pub previous: f64,
}

impl MetricSample {
    /// Percent change from `previous` to `value`. Callers guarantee `previous != 0`.
    pub fn percent_change(&self) -> f64 {
        (self.value - self.previous) / self.previous * 100.0
    }
}

/// First row of the analytics query.
///
/// Every field is coerced on its own; one unparsable column only disables
/// the categories that depend on it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalyticsRow {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weekly_transactions: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weekly_active_addresses: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weekly_transactions_change: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weekly_active_addresses_change: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub daily_tvl_usd_change: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub daily_tvl_usd: Option<f64>,
}

/// Protocol with the largest qualifying 1-day TVL change.
#[derive(Debug, Clone, PartialEq)]
pub struct TopProtocol {
    pub name: String,
    pub change_1d: f64,
    pub tvl: f64,
}

/// Average slot time over the recent performance samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkPerformance {
    pub avg_slot_ms: f64,
}

/// Accept a JSON number or numeric text; anything else becomes `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_f64))
}

/// Coerce a JSON value to a finite float.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direction_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SignalDirection::Up).unwrap(), "\"up\"");
        assert_eq!(serde_json::to_string(&SignalDirection::Flat).unwrap(), "\"flat\"");
        assert_eq!(serde_json::to_string(&SignalDirection::Down).unwrap(), "\"down\"");
    }

    #[test]
    fn test_direction_glyphs() {
        assert_eq!(SignalDirection::Up.arrow(), "↑");
        assert_eq!(SignalDirection::Down.glyph(), "▼");
        assert_eq!(SignalDirection::Up.color(), "#14F195");
    }

    #[test]
    fn test_card_field_names() {
        let card = SignalCard::new(
            Category::DefiMomentum,
            SignalDirection::Up,
            "Inflow",
            "+3.0% TVL (24h)",
        );
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(
            json,
            json!({
                "id": "defi-momentum",
                "title": "DeFi Momentum",
                "signal": "up",
                "state": "Inflow",
                "context": "+3.0% TVL (24h)"
            })
        );
    }

    #[test]
    fn test_percent_change() {
        let sample = MetricSample {
            value: 110.0,
            previous: 100.0,
        };
        assert!((sample.percent_change() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_coerce_f64() {
        assert_eq!(coerce_f64(&json!(4.5)), Some(4.5));
        assert_eq!(coerce_f64(&json!("8.25")), Some(8.25));
        assert_eq!(coerce_f64(&json!(" -3 ")), Some(-3.0));
        assert_eq!(coerce_f64(&json!("n/a")), None);
        assert_eq!(coerce_f64(&json!("NaN")), None);
        assert_eq!(coerce_f64(&json!(null)), None);
        assert_eq!(coerce_f64(&json!([1])), None);
    }

    #[test]
    fn test_analytics_row_mixed_types() {
        let row: AnalyticsRow = serde_json::from_value(json!({
            "blockchain": "solana",
            "weekly_transactions": 420000000,
            "weekly_active_addresses": "12000000",
            "weekly_transactions_change": "8",
            "weekly_active_addresses_change": 4,
            "daily_tvl_usd_change": "oops"
        }))
        .unwrap();

        assert_eq!(row.weekly_transactions, Some(420_000_000.0));
        assert_eq!(row.weekly_active_addresses, Some(12_000_000.0));
        assert_eq!(row.weekly_transactions_change, Some(8.0));
        assert_eq!(row.weekly_active_addresses_change, Some(4.0));
        assert_eq!(row.daily_tvl_usd_change, None);
        assert_eq!(row.daily_tvl_usd, None);
    }
}
