//! Liquidation Dashboard - Shared Library
//!
//! Real-time dashboard client for liquidations, large trades and funding rates.
//!
//! The library includes:
//! - Symbol catalog and core record types
//! - Event normaliser, filter state, bounded presentation buffers and funding board
//! - Settings reconciler that keeps the upstream subscription in sync
//! - Session object owning all per-session state
//! - Pure projection of session state into display rows
//! - WebSocket transport and ratatui widgets used by the binary
pub mod buffer;
pub mod config;
pub mod error;
pub mod filter;
pub mod funding;
pub mod normalizer;
pub mod projection;
pub mod reconciler;
pub mod session;
pub mod settings;
pub mod symbol;
pub mod types;
pub mod websocket;
pub mod widget;

// Re-export commonly used types for convenience
pub use buffer::{PresentationBuffer, DEFAULT_BUFFER_CAPACITY};
pub use config::DashboardConfig;
pub use error::{DashboardError, NormalizeError};
pub use filter::{Filterable, FilterState};
pub use funding::{FundingBoard, FundingSlot};
pub use normalizer::normalize;
pub use projection::{
    format_value, project, project_with_zone, DashboardView, EventRow, FundingCard,
};
pub use reconciler::SettingsReconciler;
pub use session::{IngestOutcome, Session, SessionStats};
pub use settings::{parse_threshold, SettingsForm, ThresholdField};
pub use symbol::Symbol;
pub use types::{
    EventKind, FeedMessage, FundingReading, LiquidationRecord, MarketEvent, OutboundMessage,
    SettingsUpdate, Side, TradeRecord,
};
pub use websocket::{ConnectionStatus, WebSocketClient, WebSocketConfig};
