//! Transcript Replay
//!
//! Feeds recorded console output through an in-process transport, exactly
//! as Moonraker would deliver it, and prints every prompt and dispatched
//! command.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use serde_json::json;
use tokio::sync::mpsc;

use panel_core::transport::{IncomingFrame, JsonRpcNotification};
use panel_core::{
    attach_prompt_handler, CommandDispatcher, InProcessTransport, PanelConfig, PresenterHandle,
    PrinterTransport, PromptAccumulator,
};

use crate::presenter::{write_prompt, ChannelPresenter, PresenterMessage};

/// How transcript lines are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    /// One console line per transcript line
    Console,
    /// One JSON-RPC frame per transcript line
    JsonRpc,
}

/// Counters reported at the end of a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Transcript lines read
    pub lines: usize,
    /// Prompts rendered
    pub prompts_shown: usize,
    /// Commands that reached the transport
    pub commands_sent: usize,
}

/// Drives one replay session
pub struct Replayer {
    transport: InProcessTransport,
    notify_tx: mpsc::Sender<JsonRpcNotification>,
    command_rx: mpsc::Receiver<String>,
    presenter_rx: mpsc::UnboundedReceiver<PresenterMessage>,
    // Keeps the prompt handler's accumulator alive for the session
    _accumulator: PromptAccumulator,
    notification_method: String,
    format: TranscriptFormat,
    select: Option<usize>,
    open: Option<PresenterHandle>,
    stats: ReplayStats,
}

impl Replayer {
    /// Wire up transport, presenter and accumulator from `config`
    ///
    /// When `select` is set, that button is pressed on every prompt as soon
    /// as it is shown.
    pub fn new(config: &PanelConfig, format: TranscriptFormat, select: Option<usize>) -> Self {
        let (transport, notify_tx, command_rx) =
            InProcessTransport::new_pair_with_capacity(config.transport.channel_capacity);
        let (presenter, presenter_rx) = ChannelPresenter::new(config.display.vertical_resolution);

        let accumulator = PromptAccumulator::new(
            Arc::new(presenter),
            CommandDispatcher::new(transport.command_sink()),
        );
        attach_prompt_handler(
            &transport.router(),
            &config.transport.notification_method,
            &accumulator,
        );

        Self {
            transport,
            notify_tx,
            command_rx,
            presenter_rx,
            _accumulator: accumulator,
            notification_method: config.transport.notification_method.clone(),
            format,
            select,
            open: None,
            stats: ReplayStats::default(),
        }
    }

    /// Deliver one transcript line and print whatever it caused
    ///
    /// # Errors
    ///
    /// Fails only if the output cannot be written or the transport queue is
    /// gone; malformed transcript lines are logged and skipped.
    pub fn feed_line(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<()> {
        self.stats.lines += 1;

        let notification = match self.format {
            TranscriptFormat::Console => {
                JsonRpcNotification::new(self.notification_method.as_str(), json!([line]))
            }
            TranscriptFormat::JsonRpc => match IncomingFrame::parse(line) {
                Ok(IncomingFrame::Notification(notification)) => notification,
                Ok(IncomingFrame::Response { .. }) => return Ok(()),
                Err(e) => {
                    tracing::warn!(line_number = self.stats.lines, error = %e, "Skipping transcript line");
                    return Ok(());
                }
            },
        };

        self.notify_tx
            .try_send(notification)
            .context("notification queue rejected transcript line")?;
        self.transport.process_pending();
        self.drain(out)
    }

    /// Counters so far
    pub fn stats(&self) -> ReplayStats {
        self.stats
    }

    /// Print presenter activity and dispatched commands
    fn drain(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        while let Ok(message) = self.presenter_rx.try_recv() {
            match message {
                PresenterMessage::Render {
                    handle,
                    snapshot,
                    layout,
                    on_activate,
                } => {
                    self.stats.prompts_shown += 1;
                    self.open = Some(handle);
                    write_prompt(out, &snapshot, &layout)?;

                    if let Some(index) = self.select {
                        writeln!(out, "    pressing [{index}]")?;
                        on_activate(index);
                    }
                }
                PresenterMessage::Close(handle) => {
                    if self.open == Some(handle) {
                        self.open = None;
                        writeln!(out, "    (closed)")?;
                    }
                }
            }
        }

        while let Ok(command) = self.command_rx.try_recv() {
            self.stats.commands_sent += 1;
            writeln!(out, ">>> {command}")?;
        }
        Ok(())
    }
}
