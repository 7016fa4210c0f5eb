//! Transport Traits
//!
//! Seams between the prompt subsystem and whatever carries bytes to the
//! printer host.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::rpc::NotificationRouter;

/// Errors reported by transports
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport has not connected yet, or was disconnected
    #[error("transport not connected")]
    NotConnected,

    /// The peer went away
    #[error("connection closed")]
    ConnectionClosed,

    /// A command could not be queued or written
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The peer sent something that is not valid JSON-RPC
    #[error("protocol error: {0}")]
    Protocol(String),

    /// JSON encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Socket-level I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket handshake or framing failure
    #[error("websocket error: {0}")]
    WebSocket(String),
}

/// Fire-and-forget outbound command channel
///
/// Implementations must not block: queue the command and return. The
/// command string is sent verbatim.
pub trait CommandSink: Send + Sync {
    /// Queue one G-code script for the printer
    ///
    /// # Errors
    ///
    /// Returns an error when the command cannot be queued, e.g. the
    /// connection is gone.
    fn send_command(&self, command: &str) -> Result<(), TransportError>;
}

/// A connection to the printer host
///
/// Owns the inbound pump. Notifications are routed through
/// [`NotificationRouter`] in the order the host emitted them.
#[async_trait]
pub trait PrinterTransport: Send {
    /// Router that inbound notifications are delivered to
    fn router(&self) -> NotificationRouter;

    /// Handle for sending commands, shareable with the dispatcher
    fn command_sink(&self) -> Arc<dyn CommandSink>;

    /// Pump inbound traffic until the connection closes
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails rather than closing cleanly.
    async fn run(&mut self) -> Result<(), TransportError>;

    /// Whether the transport is currently connected
    fn is_connected(&self) -> bool;
}
