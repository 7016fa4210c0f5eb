//! Command Echo
//!
//! Wraps the transport's command sink so every command the engine sends
//! also shows up in the console pane.

use std::sync::Arc;

use tokio::sync::mpsc;

use panel_core::{CommandSink, TransportError};

use crate::app::AppEvent;

/// Command sink that reports successful sends to the App
pub struct EchoSink {
    inner: Arc<dyn CommandSink>,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl EchoSink {
    pub fn new(inner: Arc<dyn CommandSink>, events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { inner, events }
    }
}

impl CommandSink for EchoSink {
    fn send_command(&self, command: &str) -> Result<(), TransportError> {
        self.inner.send_command(command)?;
        // App gone means we're shutting down
        let _ = self.events.send(AppEvent::Command(command.to_string()));
        Ok(())
    }
}
