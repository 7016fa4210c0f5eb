//! Moonraker WebSocket Transport
//!
//! Connects to Moonraker's JSON-RPC endpoint, routes inbound notifications
//! through the [`NotificationRouter`], and writes queued G-code requests.
//!
//! # Architecture
//!
//! ```text
//!   SocketSink ──unbounded queue──┐
//!                                 ▼
//!                         ┌───────────────┐   text frames   ┌───────────┐
//!                         │  run() loop   │◀───────────────▶│ Moonraker │
//!                         └───────┬───────┘                 └───────────┘
//!                                 │ notifications
//!                                 ▼
//!                         NotificationRouter
//! ```
//!
//! Connection loss ends `run()`. Reconnecting is left to the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::rpc::{JsonRpcRequest, NotificationRouter};
use super::traits::{CommandSink, PrinterTransport, TransportError};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound half: serializes commands into `printer.gcode.script` requests
#[derive(Debug)]
struct SocketSink {
    outgoing_tx: mpsc::UnboundedSender<String>,
    gcode_method: String,
    connected: Arc<AtomicBool>,
}

impl CommandSink for SocketSink {
    fn send_command(&self, command: &str) -> Result<(), TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::NotConnected);
        }

        let request = JsonRpcRequest::gcode_script(&self.gcode_method, command);
        let text = serde_json::to_string(&request)?;

        self.outgoing_tx
            .send(text)
            .map_err(|_| TransportError::ConnectionClosed)?;

        tracing::debug!(request_id = %request.id, "Queued G-code request");
        Ok(())
    }
}

/// JSON-RPC connection to a Moonraker instance
pub struct MoonrakerSocket {
    socket: Option<Socket>,
    outgoing_rx: mpsc::UnboundedReceiver<String>,
    router: NotificationRouter,
    sink: Arc<SocketSink>,
    connected: Arc<AtomicBool>,
}

impl MoonrakerSocket {
    /// Connect to `url` (e.g. `ws://printer.local:7125/websocket`)
    ///
    /// # Errors
    ///
    /// Returns an error if the WebSocket handshake fails.
    pub async fn connect(url: &str, gcode_method: &str) -> Result<Self, TransportError> {
        let (socket, _response) = connect_async(url)
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))?;

        tracing::info!(url, "Connected to Moonraker");

        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));

        Ok(Self {
            socket: Some(socket),
            outgoing_rx,
            router: NotificationRouter::new(),
            sink: Arc::new(SocketSink {
                outgoing_tx,
                gcode_method: gcode_method.to_string(),
                connected: connected.clone(),
            }),
            connected,
        })
    }
}

#[async_trait]
impl PrinterTransport for MoonrakerSocket {
    fn router(&self) -> NotificationRouter {
        self.router.clone()
    }

    fn command_sink(&self) -> Arc<dyn CommandSink> {
        self.sink.clone()
    }

    async fn run(&mut self) -> Result<(), TransportError> {
        let socket = self.socket.take().ok_or(TransportError::NotConnected)?;
        let (mut write, mut read) = socket.split();
        let router = self.router.clone();
        let connected = self.connected.clone();
        let outgoing_rx = &mut self.outgoing_rx;

        let result = loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = router.dispatch_text(&text) {
                            tracing::warn!(error = %e, "Dropping malformed frame");
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "Moonraker closed the connection");
                        break Ok(());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(TransportError::WebSocket(e.to_string())),
                    None => break Ok(()),
                },

                outgoing = outgoing_rx.recv() => match outgoing {
                    Some(text) => {
                        if let Err(e) = write.send(Message::Text(text)).await {
                            break Err(TransportError::WebSocket(e.to_string()));
                        }
                    }
                    None => break Ok(()),
                },
            }
        };

        connected.store(false, Ordering::SeqCst);
        match &result {
            Ok(()) => tracing::info!("Moonraker connection ended"),
            Err(e) => tracing::warn!(error = %e, "Moonraker connection failed"),
        }
        result
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
