//! Settings reconciler
//!
//! Pushes the active filter upstream so the feed can prune what it emits.
//! Fire-and-forget: nothing is awaited and nothing is retried here.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::filter::FilterState;
use crate::types::OutboundMessage;

/// Emits `update_settings` messages on the outbound channel
#[derive(Debug)]
pub struct SettingsReconciler {
    outbound_tx: mpsc::UnboundedSender<OutboundMessage>,
    emitted: u64,
}

impl SettingsReconciler {
    pub fn new(outbound_tx: mpsc::UnboundedSender<OutboundMessage>) -> Self {
        Self {
            outbound_tx,
            emitted: 0,
        }
    }

    /// Reconciler plus the receiving end handed to the transport
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        (Self::new(outbound_tx), outbound_rx)
    }

    /// Emit the settings for `filter`. Never blocks.
    pub fn emit(&mut self, filter: &FilterState) {
        let update = filter.to_settings_update();
        info!(
            symbols = ?update.symbols,
            min_liquidation = update.min_liquidation,
            min_trade = update.min_trade,
            "Emitting settings update"
        );

        self.emitted += 1;
        if let Err(e) = self.outbound_tx.send(OutboundMessage::UpdateSettings(update)) {
            warn!("Settings update not delivered, outbound channel closed: {}", e);
        }
    }

    /// Number of settings messages produced so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}
