//! Channel Presenter
//!
//! Forwards render and close requests to the replay loop, which prints
//! them and optionally answers the prompt.

use std::io::{self, Write};

use panel_core::{ActivationCallback, PresenterHandle, PromptLayout, PromptPresenter, PromptSnapshot};
use tokio::sync::mpsc;

/// Request from the accumulator to the replay loop
pub enum PresenterMessage {
    /// Show a prompt
    Render {
        /// Modal handle
        handle: PresenterHandle,
        /// What to show
        snapshot: PromptSnapshot,
        /// Geometry for the configured display
        layout: PromptLayout,
        /// Answer the prompt
        on_activate: ActivationCallback,
    },
    /// Remove a prompt
    Close(PresenterHandle),
}

/// Presenter that hands everything to an unbounded channel
pub struct ChannelPresenter {
    vertical_resolution: u32,
    tx: mpsc::UnboundedSender<PresenterMessage>,
}

impl ChannelPresenter {
    /// Create the presenter and the receiving end for the replay loop
    pub fn new(vertical_resolution: u32) -> (Self, mpsc::UnboundedReceiver<PresenterMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                vertical_resolution,
                tx,
            },
            rx,
        )
    }
}

impl PromptPresenter for ChannelPresenter {
    fn render(&self, snapshot: &PromptSnapshot, on_activate: ActivationCallback) -> PresenterHandle {
        let handle = PresenterHandle::new();
        let message = PresenterMessage::Render {
            handle,
            snapshot: snapshot.clone(),
            layout: PromptLayout::compute(snapshot.button_count(), self.vertical_resolution),
            on_activate,
        };
        if self.tx.send(message).is_err() {
            tracing::warn!(%handle, "Replay loop gone, prompt not shown");
        }
        handle
    }

    fn close(&self, handle: PresenterHandle) {
        // Receiver gone means nothing is displayed anyway
        let _ = self.tx.send(PresenterMessage::Close(handle));
    }
}

/// Print a prompt as a text box
pub fn write_prompt(
    out: &mut impl Write,
    snapshot: &PromptSnapshot,
    layout: &PromptLayout,
) -> io::Result<()> {
    writeln!(out, "+-- {} ({})", snapshot.header_text(), snapshot.id)?;
    if let Some(body) = &snapshot.body {
        for line in body.lines() {
            writeln!(out, "|   {line}")?;
        }
    }
    for (index, button) in snapshot.buttons.iter().enumerate() {
        writeln!(
            out,
            "|   [{index}] {} -> {:?} ({})",
            button.label, button.command, button.style
        )?;
    }
    writeln!(
        out,
        "+-- button row {}/{} units",
        layout.button_row_height_px(),
        layout.dialog_height()
    )
}
