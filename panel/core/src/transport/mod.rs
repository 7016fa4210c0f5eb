//! Transport Layer for Printer Communication
//!
//! Provides abstraction over how the panel talks to the printer host:
//! - `InProcess`: Channel pair for embedding and tests
//! - `WebSocket`: Moonraker JSON-RPC over a WebSocket (feature `websocket`)
//!
//! # Design Philosophy
//!
//! The prompt subsystem only needs two primitives from a transport:
//!
//! - register a callback for a named notification ([`NotificationRouter`])
//! - send a command without waiting for an answer ([`CommandSink`])
//!
//! Ordering of notifications is the transport's job. Retries and
//! reconnection are too; failures surface as [`TransportError`]s that the
//! dispatcher logs and drops.

pub mod config;
pub mod in_process;
pub mod rpc;
pub mod traits;
#[cfg(feature = "websocket")]
pub mod websocket;

// Re-exports for convenience
pub use config::{TransportConfig, TransportType};
pub use in_process::{ChannelSink, InProcessTransport};
pub use rpc::{
    IncomingFrame, JsonRpcNotification, JsonRpcRequest, NotificationCallback, NotificationRouter,
    RequestId,
};
pub use traits::{CommandSink, PrinterTransport, TransportError};

#[cfg(feature = "websocket")]
pub use websocket::MoonrakerSocket;
