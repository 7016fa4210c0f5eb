//! In-Process Transport
//!
//! Channel-based transport for embedding and tests. The "host" side is a
//! pair of plain tokio channels: push notifications in, read dispatched
//! commands out.
//!
//! # Usage
//!
//! ```ignore
//! let (mut transport, notify_tx, mut command_rx) = InProcessTransport::new_pair();
//!
//! attach_prompt_handler(&transport.router(), GCODE_RESPONSE_METHOD, &accumulator);
//!
//! notify_tx.send(JsonRpcNotification::new(
//!     "notify_gcode_response",
//!     json!(["// action:prompt_begin Hello"]),
//! )).await?;
//! transport.process_pending();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::rpc::{JsonRpcNotification, NotificationRouter};
use super::traits::{CommandSink, PrinterTransport, TransportError};

/// Default capacity of both channels
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Outbound half of the in-process transport
///
/// Commands are queued with `try_send`, so a full channel is reported as a
/// send failure instead of blocking the caller.
#[derive(Debug)]
pub struct ChannelSink {
    command_tx: mpsc::Sender<String>,
    connected: Arc<AtomicBool>,
}

impl CommandSink for ChannelSink {
    fn send_command(&self, command: &str) -> Result<(), TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::NotConnected);
        }

        self.command_tx
            .try_send(command.to_string())
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    TransportError::SendFailed("command channel full".to_string())
                }
                mpsc::error::TrySendError::Closed(_) => TransportError::ConnectionClosed,
            })
    }
}

/// In-process transport using tokio channels
pub struct InProcessTransport {
    /// Notifications injected by the host side
    notify_rx: mpsc::Receiver<JsonRpcNotification>,
    /// Where notifications are routed
    router: NotificationRouter,
    /// Shared outbound half
    sink: Arc<ChannelSink>,
    /// Connection state
    connected: Arc<AtomicBool>,
}

impl InProcessTransport {
    /// Create a new in-process transport pair
    ///
    /// Returns:
    /// - `InProcessTransport`: give this to the panel
    /// - `mpsc::Sender<JsonRpcNotification>`: the host pushes notifications here
    /// - `mpsc::Receiver<String>`: the host reads dispatched commands here
    #[must_use]
    pub fn new_pair() -> (
        Self,
        mpsc::Sender<JsonRpcNotification>,
        mpsc::Receiver<String>,
    ) {
        Self::new_pair_with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create with custom channel capacity
    #[must_use]
    pub fn new_pair_with_capacity(
        capacity: usize,
    ) -> (
        Self,
        mpsc::Sender<JsonRpcNotification>,
        mpsc::Receiver<String>,
    ) {
        let (notify_tx, notify_rx) = mpsc::channel(capacity);
        let (command_tx, command_rx) = mpsc::channel(capacity);
        let connected = Arc::new(AtomicBool::new(true));

        let transport = Self {
            notify_rx,
            router: NotificationRouter::new(),
            sink: Arc::new(ChannelSink {
                command_tx,
                connected: connected.clone(),
            }),
            connected,
        };

        (transport, notify_tx, command_rx)
    }

    /// Route every notification already queued, without waiting
    ///
    /// Returns how many notifications were processed.
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(notification) = self.notify_rx.try_recv() {
            self.router.dispatch(&notification);
            processed += 1;
        }
        processed
    }

    /// Mark the transport disconnected; later commands fail
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl PrinterTransport for InProcessTransport {
    fn router(&self) -> NotificationRouter {
        self.router.clone()
    }

    fn command_sink(&self) -> Arc<dyn CommandSink> {
        self.sink.clone()
    }

    async fn run(&mut self) -> Result<(), TransportError> {
        while let Some(notification) = self.notify_rx.recv().await {
            self.router.dispatch(&notification);
        }
        tracing::debug!("In-process notification channel closed");
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
