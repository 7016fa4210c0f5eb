//! Command Dispatch
//!
//! Sends the command bound to an activated button. Fire-and-forget: no
//! acknowledgement, no retry. A transport failure is logged and dropped.

use std::fmt;
use std::sync::Arc;

use crate::transport::CommandSink;

/// Sends button commands to the printer
#[derive(Clone)]
pub struct CommandDispatcher {
    sink: Arc<dyn CommandSink>,
}

impl CommandDispatcher {
    /// Create a dispatcher writing to `sink`
    #[must_use]
    pub fn new(sink: Arc<dyn CommandSink>) -> Self {
        Self { sink }
    }

    /// Send `command` verbatim
    ///
    /// Empty commands are sent as well; the printer decides what they mean.
    pub fn dispatch(&self, command: &str) {
        match self.sink.send_command(command) {
            Ok(()) => tracing::debug!(command, "Dispatched prompt command"),
            Err(e) => tracing::warn!(command, error = %e, "Failed to dispatch prompt command"),
        }
    }
}

impl fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDispatcher").finish_non_exhaustive()
    }
}
