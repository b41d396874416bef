//! Filter state
//!
//! Single source of truth for "is this event worth displaying". Replaced
//! wholesale on every settings application, never patched field by field.

use indexmap::IndexSet;

use crate::symbol::Symbol;
use crate::types::{FundingReading, LiquidationRecord, SettingsUpdate, TradeRecord};

/// Default liquidation threshold (USD)
pub const DEFAULT_MIN_LIQUIDATION_USD: f64 = 100_000.0;

/// Default trade threshold (USD)
pub const DEFAULT_MIN_TRADE_USD: f64 = 500_000.0;

/// Symbols active at session start
pub const DEFAULT_SYMBOLS: [Symbol; 2] = [Symbol::Btc, Symbol::Eth];

/// Active symbols plus per-kind USD thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    active_symbols: IndexSet<Symbol>,
    min_liquidation_value: f64,
    min_trade_value: f64,
}

impl FilterState {
    /// Thresholds that are negative or non-finite are clamped to zero.
    pub fn new(
        symbols: impl IntoIterator<Item = Symbol>,
        min_liquidation_value: f64,
        min_trade_value: f64,
    ) -> Self {
        Self {
            active_symbols: symbols.into_iter().collect(),
            min_liquidation_value: sanitize_threshold(min_liquidation_value),
            min_trade_value: sanitize_threshold(min_trade_value),
        }
    }

    /// Active symbols in the order they were selected
    pub fn active_symbols(&self) -> &IndexSet<Symbol> {
        &self.active_symbols
    }

    pub fn is_active(&self, symbol: Symbol) -> bool {
        self.active_symbols.contains(&symbol)
    }

    pub fn min_liquidation_value(&self) -> f64 {
        self.min_liquidation_value
    }

    pub fn min_trade_value(&self) -> f64 {
        self.min_trade_value
    }

    pub fn accepts_liquidation(&self, record: &LiquidationRecord) -> bool {
        self.is_active(record.symbol) && record.usd_value >= self.min_liquidation_value
    }

    pub fn accepts_trade(&self, record: &TradeRecord) -> bool {
        self.is_active(record.symbol) && record.usd_value >= self.min_trade_value
    }

    /// Thresholds do not apply to funding readings
    pub fn accepts_funding(&self, reading: &FundingReading) -> bool {
        self.is_active(reading.symbol)
    }

    /// Swap the whole configuration in one step, returning the previous one.
    ///
    /// Callers that own a funding board and reconciler must go through
    /// [`Session::apply_settings`](crate::session::Session::apply_settings),
    /// which reindexes the board and emits the new settings upstream.
    pub fn replace(&mut self, next: FilterState) -> FilterState {
        std::mem::replace(self, next)
    }

    /// Outbound representation of this configuration
    pub fn to_settings_update(&self) -> SettingsUpdate {
        SettingsUpdate {
            symbols: self.active_symbols.iter().copied().collect(),
            min_liquidation: self.min_liquidation_value,
            min_trade: self.min_trade_value,
        }
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(
            DEFAULT_SYMBOLS,
            DEFAULT_MIN_LIQUIDATION_USD,
            DEFAULT_MIN_TRADE_USD,
        )
    }
}

fn sanitize_threshold(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Records that can be checked against a [`FilterState`]
pub trait Filterable {
    fn is_accepted_by(&self, filter: &FilterState) -> bool;
}

impl Filterable for LiquidationRecord {
    fn is_accepted_by(&self, filter: &FilterState) -> bool {
        filter.accepts_liquidation(self)
    }
}

impl Filterable for TradeRecord {
    fn is_accepted_by(&self, filter: &FilterState) -> bool {
        filter.accepts_trade(self)
    }
}

impl Filterable for FundingReading {
    fn is_accepted_by(&self, filter: &FilterState) -> bool {
        filter.accepts_funding(self)
    }
}
