//! Dashboard configuration from environment variables
//!
//! | Variable            | Default                  |
//! |---------------------|--------------------------|
//! | `WS_URL`            | `ws://127.0.0.1:5000/ws` |
//! | `WS_PING_SECS`      | 30                       |
//! | `WS_RECONNECT_SECS` | 2                        |
//! | `WS_BUFFER_SIZE`    | 1000                     |
//! | `BUFFER_CAPACITY`   | 50 (also the maximum)    |
//! | `TICK_MS`           | 250                      |
//!
//! Unparseable numbers fall back to the default with a warning. A URL that is
//! not `ws://` or `wss://` is an error.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::buffer::DEFAULT_BUFFER_CAPACITY;
use crate::error::DashboardError;
use crate::websocket::WebSocketConfig;

/// Default UI redraw interval
pub const DEFAULT_TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub websocket: WebSocketConfig,
    /// Records kept per presentation buffer
    pub buffer_capacity: usize,
    /// UI redraw interval
    pub tick_rate: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            websocket: WebSocketConfig::default(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            tick_rate: DEFAULT_TICK_RATE,
        }
    }
}

impl DashboardConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, so tests need not touch the
    /// process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = WebSocketConfig::default();

        let url = lookup("WS_URL").unwrap_or(defaults.url);
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(DashboardError::Config {
                key: "WS_URL",
                value: url,
            });
        }

        let ping_secs = parse_or(&lookup, "WS_PING_SECS", defaults.ping_interval.as_secs());
        let reconnect_secs = parse_or(
            &lookup,
            "WS_RECONNECT_SECS",
            defaults.reconnect_delay.as_secs(),
        );
        let channel_buffer_size = parse_or(
            &lookup,
            "WS_BUFFER_SIZE",
            defaults.channel_buffer_size,
        );
        let mut buffer_capacity = parse_or(&lookup, "BUFFER_CAPACITY", DEFAULT_BUFFER_CAPACITY);
        if buffer_capacity > DEFAULT_BUFFER_CAPACITY {
            warn!(
                "BUFFER_CAPACITY={} exceeds the maximum, clamping to {}",
                buffer_capacity, DEFAULT_BUFFER_CAPACITY
            );
            buffer_capacity = DEFAULT_BUFFER_CAPACITY;
        }
        let tick_ms = parse_or(&lookup, "TICK_MS", DEFAULT_TICK_RATE.as_millis() as u64);

        Ok(Self {
            websocket: WebSocketConfig::new(url)
                .with_ping_interval(Duration::from_secs(ping_secs.max(1)))
                .with_reconnect_delay(Duration::from_secs(reconnect_secs))
                .with_channel_buffer_size(channel_buffer_size.max(1)),
            buffer_capacity: buffer_capacity.max(1),
            tick_rate: Duration::from_millis(tick_ms.max(10)),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Debug,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Invalid {}={:?}, using default {:?}", key, raw, default);
                default
            }
        },
    }
}
