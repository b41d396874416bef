//! Dashboard session
//!
//! Owns every piece of per-session state: the filter, both presentation
//! buffers, the funding board and the settings reconciler. A session is built
//! at start-up, consumes feed frames in arrival order, and is dropped when the
//! dashboard exits. Nothing is shared or persisted.

use tracing::{debug, info};

use crate::buffer::{PresentationBuffer, DEFAULT_BUFFER_CAPACITY};
use crate::filter::FilterState;
use crate::funding::FundingBoard;
use crate::normalizer::normalize;
use crate::reconciler::SettingsReconciler;
use crate::types::{EventKind, FeedMessage, LiquidationRecord, MarketEvent, TradeRecord};

/// What happened to one inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Passed the filter and is now displayed
    Accepted(EventKind),
    /// Well-formed but rejected by the filter
    Filtered(EventKind),
    /// Dropped by the normaliser
    Malformed,
    /// Welcome / acknowledgement frame
    Control,
}

/// Running counters for the status bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Well-formed liquidations and trades, displayed or not
    pub events: u64,
    /// Non-control frames, including malformed ones
    pub received: u64,
    pub accepted: u64,
    pub filtered: u64,
    pub malformed: u64,
}

#[derive(Debug)]
pub struct Session {
    filter: FilterState,
    liquidations: PresentationBuffer<LiquidationRecord>,
    trades: PresentationBuffer<TradeRecord>,
    funding: FundingBoard,
    reconciler: SettingsReconciler,
    stats: SessionStats,
}

impl Session {
    /// Start a session with default filter state and buffer capacity.
    ///
    /// Emits the initial settings once so the feed knows the subscription
    /// before any user interaction.
    pub fn start(reconciler: SettingsReconciler) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY, reconciler)
    }

    /// Start a session whose buffers hold `capacity` records each
    pub fn with_capacity(capacity: usize, reconciler: SettingsReconciler) -> Self {
        let filter = FilterState::default();
        let mut session = Self {
            funding: FundingBoard::for_filter(&filter),
            filter,
            liquidations: PresentationBuffer::with_capacity(capacity),
            trades: PresentationBuffer::with_capacity(capacity),
            reconciler,
            stats: SessionStats::default(),
        };
        session.reconciler.emit(&session.filter);
        session
    }

    /// Feed one inbound frame through normaliser and filter
    pub fn ingest(&mut self, message: &FeedMessage) -> IngestOutcome {
        if message.is_control() {
            debug!(kind = %message.kind, "Ignoring control frame");
            return IngestOutcome::Control;
        }

        self.stats.received += 1;
        match normalize(message) {
            Ok(event) => self.apply_event(event),
            Err(error) => {
                self.stats.malformed += 1;
                debug!(kind = %message.kind, %error, "Dropping malformed feed message");
                IngestOutcome::Malformed
            }
        }
    }

    /// Route an already-normalised event to its buffer or board slot
    pub fn apply_event(&mut self, event: MarketEvent) -> IngestOutcome {
        let kind = event.kind();
        let symbol = event.symbol();
        if kind != EventKind::Funding {
            self.stats.events += 1;
        }

        let accepted = match event {
            MarketEvent::Liquidation(liq) => self.liquidations.push(liq, &self.filter),
            MarketEvent::Trade(trade) => self.trades.push(trade, &self.filter),
            MarketEvent::Funding(reading) => self.funding.update(reading, &self.filter),
        };

        if accepted {
            self.stats.accepted += 1;
            IngestOutcome::Accepted(kind)
        } else {
            self.stats.filtered += 1;
            debug!(%kind, %symbol, "Filtered feed event");
            IngestOutcome::Filtered(kind)
        }
    }

    /// Replace the filter wholesale, reindex the funding board and emit the
    /// new settings upstream. Returns the previous filter.
    pub fn apply_settings(&mut self, next: FilterState) -> FilterState {
        let previous = self.filter.replace(next);
        self.funding
            .reindex(self.filter.active_symbols().iter().copied());
        self.reconciler.emit(&self.filter);

        info!(
            symbols = ?self.filter.active_symbols(),
            min_liquidation = self.filter.min_liquidation_value(),
            min_trade = self.filter.min_trade_value(),
            "Applied settings"
        );
        previous
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn liquidations(&self) -> &PresentationBuffer<LiquidationRecord> {
        &self.liquidations
    }

    pub fn trades(&self) -> &PresentationBuffer<TradeRecord> {
        &self.trades
    }

    pub fn funding(&self) -> &FundingBoard {
        &self.funding
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Settings messages emitted, including the one at start-up
    pub fn settings_emitted(&self) -> u64 {
        self.reconciler.emitted()
    }
}
