/// WebSocket client for the dashboard feed
///
/// Provides automatic reconnection, heartbeat, frame parsing and the outbound
/// settings path. The latest settings message is replayed on every reconnect.

use crate::types::{FeedMessage, OutboundMessage};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// WebSocket client configuration
#[derive(Debug, Clone)]
pub struct WebSocketConfig {
    /// WebSocket server URL
    pub url: String,
    /// Ping interval to keep connection alive
    pub ping_interval: Duration,
    /// Reconnection delay after disconnect
    pub reconnect_delay: Duration,
    /// Maximum channel buffer size for events
    pub channel_buffer_size: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:5000/ws".to_string(),
            ping_interval: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(2),
            channel_buffer_size: 1000,
        }
    }
}

impl WebSocketConfig {
    /// Create a new configuration with custom URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set ping interval
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Set reconnect delay
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Set channel buffer size
    pub fn with_channel_buffer_size(mut self, size: usize) -> Self {
        self.channel_buffer_size = size;
        self
    }
}

/// Connection status updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Reconnecting,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::Reconnecting => "Reconnecting",
        }
    }
}

/// WebSocket client for dashboard feed frames
pub struct WebSocketClient {
    config: WebSocketConfig,
}

impl WebSocketClient {
    /// Create a new WebSocket client with default configuration
    pub fn new() -> Self {
        Self::with_config(WebSocketConfig::default())
    }

    /// Create a new WebSocket client with custom configuration
    pub fn with_config(config: WebSocketConfig) -> Self {
        Self { config }
    }

    /// Start the WebSocket client connection
    ///
    /// `outbound_rx` carries settings messages to write upstream. Returns a
    /// receiver for feed frames in arrival order and a receiver for
    /// connection status updates.
    pub fn start(
        self,
        outbound_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ) -> (
        mpsc::Receiver<FeedMessage>,
        mpsc::Receiver<ConnectionStatus>,
    ) {
        let (event_tx, event_rx) = mpsc::channel(self.config.channel_buffer_size);
        let (status_tx, status_rx) = mpsc::channel(10);

        tokio::spawn(async move {
            run_websocket_loop(self.config, event_tx, status_tx, outbound_rx).await;
        });

        (event_rx, status_rx)
    }
}

impl Default for WebSocketClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one text frame. Control frames and garbage yield `None`.
pub fn parse_frame(text: &str) -> Option<FeedMessage> {
    match serde_json::from_str::<FeedMessage>(text) {
        Ok(message) if message.is_control() => {
            debug!("Received {} frame", message.kind);
            None
        }
        Ok(message) => Some(message),
        Err(e) => {
            debug!("Failed to parse frame: {}", e);
            debug!("Raw frame: {}", text);
            None
        }
    }
}

enum SessionEnd {
    /// Connection dropped, try again after the reconnect delay
    Reconnect,
    /// Nobody is listening for events any more
    Shutdown,
}

/// Main WebSocket connection loop with auto-reconnect
async fn run_websocket_loop(
    config: WebSocketConfig,
    event_tx: mpsc::Sender<FeedMessage>,
    status_tx: mpsc::Sender<ConnectionStatus>,
    mut outbound_rx: mpsc::UnboundedReceiver<OutboundMessage>,
) {
    info!("Starting WebSocket client for {}", config.url);

    // Serialised form of the latest settings message, replayed on reconnect
    let mut last_settings: Option<String> = None;
    let mut outbound_open = true;

    loop {
        // Notify about reconnection attempt
        let _ = status_tx.send(ConnectionStatus::Reconnecting).await;

        match connect_async(&config.url).await {
            Ok((ws_stream, _)) => {
                info!("Connected to WebSocket server at {}", config.url);
                let _ = status_tx.send(ConnectionStatus::Connected).await;

                let (mut write, mut read) = ws_stream.split();

                if let Some(settings) = &last_settings {
                    debug!("Replaying settings after reconnect");
                    if let Err(e) = write.send(Message::Text(settings.clone().into())).await {
                        warn!("Failed to replay settings: {}", e);
                    }
                }

                let mut ping = tokio::time::interval(config.ping_interval);
                // First tick completes immediately
                ping.tick().await;

                let end = loop {
                    tokio::select! {
                        msg = read.next() => match msg {
                            Some(Ok(Message::Text(text))) => {
                                let Some(message) = parse_frame(&text) else {
                                    continue;
                                };
                                if event_tx.send(message).await.is_err() {
                                    warn!("Event receiver dropped, stopping client");
                                    break SessionEnd::Shutdown;
                                }
                            }
                            Some(Ok(Message::Close(_))) => {
                                info!("Server closed connection");
                                break SessionEnd::Reconnect;
                            }
                            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                                // Heartbeat messages - tungstenite handles these automatically
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                error!("WebSocket error: {}", e);
                                break SessionEnd::Reconnect;
                            }
                            None => break SessionEnd::Reconnect,
                        },
                        outbound = outbound_rx.recv(), if outbound_open => match outbound {
                            Some(message) => match serde_json::to_string(&message) {
                                Ok(json) => {
                                    last_settings = Some(json.clone());
                                    if write.send(Message::Text(json.into())).await.is_err() {
                                        debug!("Failed to send settings, connection likely dead");
                                        break SessionEnd::Reconnect;
                                    }
                                }
                                Err(e) => error!("Failed to serialise outbound message: {}", e),
                            },
                            None => {
                                debug!("Outbound channel closed");
                                outbound_open = false;
                            }
                        },
                        _ = ping.tick() => {
                            if write.send(Message::Ping(vec![].into())).await.is_err() {
                                debug!("Failed to send ping, connection likely dead");
                                break SessionEnd::Reconnect;
                            }
                        }
                    }
                };

                // Notify disconnection
                let _ = status_tx.send(ConnectionStatus::Disconnected).await;

                if let SessionEnd::Shutdown = end {
                    return;
                }
                warn!("Connection closed, will reconnect...");
            }
            Err(e) => {
                error!("Failed to connect to {}: {}", config.url, e);
                let _ = status_tx.send(ConnectionStatus::Disconnected).await;
            }
        }

        if event_tx.is_closed() {
            return;
        }

        // Wait before reconnecting
        debug!("Waiting {:?} before reconnecting...", config.reconnect_delay);
        tokio::time::sleep(config.reconnect_delay).await;
    }
}
