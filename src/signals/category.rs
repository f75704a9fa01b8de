//! The six fixed signal categories.
//!
//! Each variant carries its own title, classification rule and label table,
//! so adding a category without a complete label set does not compile.

use crate::models::SignalDirection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One fixed signal category. Declaration order is snapshot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    NetworkActivity,
    DefiMomentum,
    UserDemand,
    Attention,
    ProtocolHighlight,
    Stability,
}

/// How a category turns a delta into a direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// `Up` above `threshold`, `Down` below `-threshold`.
    Symmetric(f64),
    /// `Up` above `upper`, `Down` below `lower`.
    Bounds { upper: f64, lower: f64 },
    /// `Up` whenever a qualifying entry exists.
    Presence,
}

/// State labels for each direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelTable {
    pub up: &'static str,
    pub flat: &'static str,
    pub down: &'static str,
}

impl LabelTable {
    pub fn get(&self, direction: SignalDirection) -> &'static str {
        match direction {
            SignalDirection::Up => self.up,
            SignalDirection::Flat => self.flat,
            SignalDirection::Down => self.down,
        }
    }
}

impl Category {
    pub const COUNT: usize = 6;

    pub const ALL: [Category; Category::COUNT] = [
        Category::NetworkActivity,
        Category::DefiMomentum,
        Category::UserDemand,
        Category::Attention,
        Category::ProtocolHighlight,
        Category::Stability,
    ];

    /// Stable key used in serialized output.
    pub fn id(&self) -> &'static str {
        match self {
            Category::NetworkActivity => "network-activity",
            Category::DefiMomentum => "defi-momentum",
            Category::UserDemand => "user-demand",
            Category::Attention => "attention",
            Category::ProtocolHighlight => "protocol-highlight",
            Category::Stability => "stability",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::NetworkActivity => "Network Activity",
            Category::DefiMomentum => "DeFi Momentum",
            Category::UserDemand => "User Demand",
            Category::Attention => "Attention / Fees",
            Category::ProtocolHighlight => "Protocol Highlight",
            Category::Stability => "Stability",
        }
    }

    /// Position in the snapshot.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn rule(&self) -> Rule {
        match self {
            Category::NetworkActivity => Rule::Symmetric(3.0),
            Category::DefiMomentum => Rule::Symmetric(2.0),
            Category::UserDemand => Rule::Symmetric(5.0),
            Category::Attention => Rule::Symmetric(5.0),
            Category::ProtocolHighlight => Rule::Presence,
            // Slow slots are flagged earlier than fast ones.
            Category::Stability => Rule::Bounds {
                upper: 10.0,
                lower: -5.0,
            },
        }
    }

    pub fn labels(&self) -> LabelTable {
        match self {
            Category::NetworkActivity => LabelTable {
                up: "Heating up",
                flat: "Normal range",
                down: "Cooling down",
            },
            Category::DefiMomentum => LabelTable {
                up: "Inflow",
                flat: "Flat",
                down: "Outflow",
            },
            Category::UserDemand => LabelTable {
                up: "Demand rising",
                flat: "Steady",
                down: "Demand falling",
            },
            Category::Attention => LabelTable {
                up: "Fee spike",
                flat: "Normal",
                down: "Fees dropping",
            },
            // `up` is appended to the protocol name.
            Category::ProtocolHighlight => LabelTable {
                up: "surging",
                flat: "No standout",
                down: "Fading",
            },
            Category::Stability => LabelTable {
                up: "Congested",
                flat: "Stable",
                down: "Fast & smooth",
            },
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}
