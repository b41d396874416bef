//! Funding board
//!
//! One slot per active symbol, latest reading wins. Slots follow the active
//! symbol set: [`FundingBoard::reindex`] runs on every settings application.

use indexmap::IndexMap;

use crate::filter::{Filterable, FilterState};
use crate::symbol::Symbol;
use crate::types::FundingReading;

/// |annualised %| above which a reading is flagged extreme (display only)
pub const EXTREME_ANNUALIZED_PCT: f64 = 50.0;

/// Card state for one symbol
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FundingSlot {
    /// Active symbol with no reading yet
    #[default]
    NoData,
    Reading(FundingReading),
}

impl FundingSlot {
    pub fn reading(&self) -> Option<&FundingReading> {
        match self {
            FundingSlot::NoData => None,
            FundingSlot::Reading(reading) => Some(reading),
        }
    }

    pub fn has_data(&self) -> bool {
        matches!(self, FundingSlot::Reading(_))
    }

    /// Flag only, never a reason to hide the reading
    pub fn is_extreme(&self) -> bool {
        self.reading()
            .is_some_and(|reading| reading.annualized_rate.abs() > EXTREME_ANNUALIZED_PCT)
    }
}

/// Latest funding reading per active symbol
#[derive(Debug, Clone, Default)]
pub struct FundingBoard {
    slots: IndexMap<Symbol, FundingSlot>,
}

impl FundingBoard {
    /// Board with a [`FundingSlot::NoData`] slot per symbol
    pub fn new(active_symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let mut board = Self::default();
        board.reindex(active_symbols);
        board
    }

    pub fn for_filter(filter: &FilterState) -> Self {
        Self::new(filter.active_symbols().iter().copied())
    }

    /// Overwrite the slot for the reading's symbol. No-op for inactive symbols.
    pub fn update(&mut self, reading: FundingReading, filter: &FilterState) -> bool {
        if !reading.is_accepted_by(filter) {
            return false;
        }

        match self.slots.get_mut(&reading.symbol) {
            Some(slot) => {
                *slot = FundingSlot::Reading(reading);
                true
            }
            None => false,
        }
    }

    /// Rebuild the slot set to exactly `active_symbols`, in that order.
    ///
    /// Symbols that stay active keep their latest reading; new symbols start
    /// as [`FundingSlot::NoData`]; everything else is discarded.
    pub fn reindex(&mut self, active_symbols: impl IntoIterator<Item = Symbol>) {
        let mut previous = std::mem::take(&mut self.slots);
        self.slots = active_symbols
            .into_iter()
            .map(|symbol| {
                let slot = previous.swap_remove(&symbol).unwrap_or_default();
                (symbol, slot)
            })
            .collect();
    }

    pub fn get(&self, symbol: Symbol) -> Option<&FundingSlot> {
        self.slots.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots in active-symbol order
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &FundingSlot)> {
        self.slots.iter().map(|(symbol, slot)| (*symbol, slot))
    }
}
