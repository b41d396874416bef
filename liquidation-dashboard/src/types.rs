//! Core data types for dashboard events
//!
//! Inbound frames match the JSON message format pushed by the dashboard feed;
//! records are the canonical, already-normalised forms held by the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::symbol::Symbol;

/// Frame envelope received from the feed
///
/// Liquidation and trade frames carry their payload in `data`; funding frames
/// carry the raw pair in the top-level `symbol` field.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FeedMessage {
    /// Event kind: "liquidation", "trade", "funding", or a control frame
    #[serde(rename = "type", alias = "event")]
    pub kind: String,
    /// Raw trading pair (funding frames only, e.g. "BTCUSDT")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Server-side emission time (ISO 8601 or epoch millis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<serde_json::Value>,
    /// Event-specific data (interpreted based on `kind`)
    #[serde(default)]
    pub data: serde_json::Value,
}

impl FeedMessage {
    /// Build a frame for `kind` with the given payload
    pub fn new(kind: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            symbol: None,
            timestamp: None,
            data,
        }
    }

    /// Attach the top-level raw pair
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Welcome and settings acknowledgement frames never reach the pipeline
    pub fn is_control(&self) -> bool {
        matches!(self.kind.as_str(), "welcome" | "settings_updated")
    }
}

/// Pipeline event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Liquidation,
    Trade,
    Funding,
}

impl EventKind {
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "liquidation" => Some(EventKind::Liquidation),
            "trade" => Some(EventKind::Trade),
            "funding" => Some(EventKind::Funding),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Liquidation => "liquidation",
            EventKind::Trade => "trade",
            EventKind::Funding => "funding",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Order side (Buy or Sell)
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Parse a wire side, case-insensitive
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BUY" => Some(Side::Buy),
            "SELL" => Some(Side::Sell),
            _ => None,
        }
    }

    /// Convert to display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }

    /// Check if this is a buy order
    pub fn is_buy(&self) -> bool {
        matches!(self, Side::Buy)
    }

    /// Check if this is a sell order
    pub fn is_sell(&self) -> bool {
        matches!(self, Side::Sell)
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Forced position closure
///
/// A SELL liquidation closes a long position, a BUY closes a short.
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidationRecord {
    pub symbol: Symbol,
    pub side: Side,
    pub price: f64,
    pub usd_value: f64,
    pub time: DateTime<Utc>,
}

impl LiquidationRecord {
    /// True when a long position was liquidated
    pub fn is_long(&self) -> bool {
        self.side.is_sell()
    }
}

/// Large trade, time string pre-formatted upstream
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub symbol: Symbol,
    pub direction: Side,
    pub usd_value: f64,
    pub display_time: String,
}

/// Latest funding rate reading for one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct FundingReading {
    pub symbol: Symbol,
    /// Fractional rate per funding interval (0.0001 = 0.01%)
    pub rate: f64,
    /// Annualised rate in percentage points
    pub annualized_rate: f64,
    /// Free-form trend label from upstream
    pub direction: String,
}

/// Normalised inbound event
#[derive(Debug, Clone, PartialEq)]
pub enum MarketEvent {
    Liquidation(LiquidationRecord),
    Trade(TradeRecord),
    Funding(FundingReading),
}

impl MarketEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            MarketEvent::Liquidation(_) => EventKind::Liquidation,
            MarketEvent::Trade(_) => EventKind::Trade,
            MarketEvent::Funding(_) => EventKind::Funding,
        }
    }

    pub fn symbol(&self) -> Symbol {
        match self {
            MarketEvent::Liquidation(liq) => liq.symbol,
            MarketEvent::Trade(trade) => trade.symbol,
            MarketEvent::Funding(reading) => reading.symbol,
        }
    }
}

/// Subscription settings sent upstream so emission can be pruned
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub symbols: Vec<Symbol>,
    pub min_liquidation: f64,
    pub min_trade: f64,
}

/// Messages written to the feed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum OutboundMessage {
    UpdateSettings(SettingsUpdate),
}
