//! JSON-RPC Frames and Notification Routing
//!
//! Moonraker speaks JSON-RPC 2.0. The panel sends requests (G-code
//! scripts) and receives responses plus unsolicited notifications such as
//! `notify_gcode_response`.
//!
//! # Architecture
//!
//! ```text
//!                        NotificationRouter
//!              ┌─────────────────────────────────────────┐
//!              │ HashMap<method, Vec<Subscription>>      │
//!              │   - wrapped in Arc<RwLock<>>            │
//!              └───────────────┬─────────────────────────┘
//!                              │ dispatch(notification)
//!            ┌─────────────────┼──────────────────┐
//!            ▼                 ▼                  ▼
//!     prompt_accumulator   console_log        status_bar
//! ```
//!
//! Callbacks are cloned out of the map before being invoked, so a callback
//! may register or unregister subscriptions without deadlocking.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::traits::TransportError;

/// JSON-RPC protocol version tag
pub const JSONRPC_VERSION: &str = "2.0";

// ============================================================================
// Frames
// ============================================================================

/// Identifier of an outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Create a new unique request ID
    #[must_use]
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Get the raw numeric value
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound JSON-RPC request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Always `"2.0"`
    pub jsonrpc: String,
    /// Remote method name
    pub method: String,
    /// Named or positional parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Correlation id
    pub id: RequestId,
}

impl JsonRpcRequest {
    /// Create a request with a fresh id
    #[must_use]
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: RequestId::new(),
        }
    }

    /// Request that runs a G-code script on the printer
    ///
    /// `method` is normally `printer.gcode.script`.
    #[must_use]
    pub fn gcode_script(method: &str, script: &str) -> Self {
        Self::new(method, Some(serde_json::json!({ "script": script })))
    }
}

/// Inbound notification (no id, no response expected)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// Always `"2.0"`
    pub jsonrpc: String,
    /// Notification name
    pub method: String,
    /// Parameters, `Null` when absent
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcNotification {
    /// Create a notification
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// Anything the host can send us
#[derive(Debug, Clone, PartialEq)]
pub enum IncomingFrame {
    /// Unsolicited notification
    Notification(JsonRpcNotification),

    /// Answer to one of our requests
    Response {
        /// Id of the request being answered, if the host echoed one
        id: Option<u64>,
        /// Successful result
        result: Option<Value>,
        /// Error object
        error: Option<Value>,
    },
}

impl IncomingFrame {
    /// Classify one text frame
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON, or is JSON that is neither
    /// a notification nor a response.
    pub fn parse(text: &str) -> Result<Self, TransportError> {
        let mut value: Value = serde_json::from_str(text)?;

        if let Some(method) = value.get("method").and_then(Value::as_str) {
            let method = method.to_string();
            let params = value
                .get_mut("params")
                .map(Value::take)
                .unwrap_or(Value::Null);
            return Ok(Self::Notification(JsonRpcNotification::new(method, params)));
        }

        if value.get("result").is_some() || value.get("error").is_some() {
            return Ok(Self::Response {
                id: value.get("id").and_then(Value::as_u64),
                result: value.get_mut("result").map(Value::take),
                error: value.get_mut("error").map(Value::take),
            });
        }

        Err(TransportError::Protocol(
            "frame has neither method nor result".to_string(),
        ))
    }
}

// ============================================================================
// Routing
// ============================================================================

/// Callback invoked with a notification's `params`
pub type NotificationCallback = Arc<dyn Fn(&Value) + Send + Sync>;

struct Subscription {
    subscriber: String,
    callback: NotificationCallback,
}

/// Routes notifications to named subscribers
///
/// Cheap to clone; clones share the same routing table.
#[derive(Clone, Default)]
pub struct NotificationRouter {
    routes: Arc<RwLock<HashMap<String, Vec<Subscription>>>>,
}

impl NotificationRouter {
    /// Create an empty router
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `method` under the name `subscriber`
    ///
    /// Registering the same subscriber twice for a method replaces the
    /// earlier callback in place. Subscribers are invoked in registration
    /// order.
    pub fn register(
        &self,
        method: &str,
        subscriber: &str,
        callback: impl Fn(&Value) + Send + Sync + 'static,
    ) {
        let callback: NotificationCallback = Arc::new(callback);
        let mut routes = self.routes.write();
        let subscriptions = routes.entry(method.to_string()).or_default();

        if let Some(existing) = subscriptions
            .iter_mut()
            .find(|s| s.subscriber == subscriber)
        {
            existing.callback = callback;
            tracing::debug!(method, subscriber, "Replaced notification callback");
        } else {
            subscriptions.push(Subscription {
                subscriber: subscriber.to_string(),
                callback,
            });
            tracing::debug!(method, subscriber, "Registered notification callback");
        }
    }

    /// Remove a subscriber; returns whether it was registered
    pub fn unregister(&self, method: &str, subscriber: &str) -> bool {
        let mut routes = self.routes.write();
        let Some(subscriptions) = routes.get_mut(method) else {
            return false;
        };

        let before = subscriptions.len();
        subscriptions.retain(|s| s.subscriber != subscriber);
        let removed = subscriptions.len() != before;

        if subscriptions.is_empty() {
            routes.remove(method);
        }
        removed
    }

    /// Number of subscribers for a method
    #[must_use]
    pub fn subscriber_count(&self, method: &str) -> usize {
        self.routes.read().get(method).map_or(0, Vec::len)
    }

    /// Deliver a notification to every subscriber of its method
    ///
    /// Returns how many callbacks were invoked.
    pub fn dispatch(&self, notification: &JsonRpcNotification) -> usize {
        let callbacks: Vec<NotificationCallback> = {
            let routes = self.routes.read();
            match routes.get(&notification.method) {
                Some(subscriptions) => subscriptions.iter().map(|s| s.callback.clone()).collect(),
                None => Vec::new(),
            }
        };

        tracing::trace!(
            method = %notification.method,
            subscribers = callbacks.len(),
            "Dispatching notification"
        );

        for callback in &callbacks {
            callback(&notification.params);
        }
        callbacks.len()
    }

    /// Parse a text frame and route it if it is a notification
    ///
    /// Responses are logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be parsed.
    pub fn dispatch_text(&self, text: &str) -> Result<usize, TransportError> {
        match IncomingFrame::parse(text)? {
            IncomingFrame::Notification(notification) => Ok(self.dispatch(&notification)),
            IncomingFrame::Response { id, error, .. } => {
                if let Some(error) = error {
                    tracing::warn!(request_id = ?id, %error, "Host returned an error");
                } else {
                    tracing::trace!(request_id = ?id, "Response received");
                }
                Ok(0)
            }
        }
    }
}

impl fmt::Debug for NotificationRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routes = self.routes.read();
        let mut methods: Vec<_> = routes.keys().collect();
        methods.sort();
        f.debug_struct("NotificationRouter")
            .field("methods", &methods)
            .finish()
    }
}
