//! Panel Core - Headless Action-Prompt Engine
//!
//! Printer macros ask the operator questions by writing specially-prefixed
//! lines into the ordinary console-response stream. This crate turns those
//! lines into one coherent dialog, hands it to whatever surface is drawing
//! the screen, and routes the operator's choice back to the printer as a
//! single G-code command.
//!
//! # Architecture
//!
//! ```text
//!   Moonraker ──notify_gcode_response──▶ NotificationRouter
//!                                               │ params[0]
//!                                               ▼
//!                                   ActionCommentExtractor
//!                                               │ ActionComment
//!                                               ▼
//!                 ┌──────────────────── PromptAccumulator ───────────────────┐
//!                 │  PromptModel (header, body, buttons, state)               │
//!                 │  Idle ──begin──▶ Building ──show──▶ Shown ──end──▶ Idle   │
//!                 └──────┬──────────────────────────────────────▲────────────┘
//!                        │ PromptSnapshot                       │ button index
//!                        ▼                                      │
//!                 PromptPresenter (TUI, headless, ...) ─────────┘
//!                                               │
//!                                               ▼
//!                                     CommandDispatcher ──printer.gcode.script──▶
//! ```
//!
//! # Design Philosophy
//!
//! - The core never draws anything. Surfaces implement [`PromptPresenter`]
//!   and receive immutable [`PromptSnapshot`]s.
//! - Protocol input is untrusted. Every malformed, truncated, or
//!   out-of-order line degrades to a logged no-op; nothing on the
//!   notification path returns an error or panics.
//! - One prompt at a time. A fresh `prompt_begin` always pre-empts whatever
//!   was being built or shown.
//!
//! # Example
//!
//! ```ignore
//! let (transport, notify_tx, mut command_rx) = InProcessTransport::new_pair();
//! let presenter = Arc::new(HeadlessPresenter::new(480));
//! let accumulator = PromptAccumulator::new(
//!     presenter.clone(),
//!     CommandDispatcher::new(transport.command_sink()),
//! );
//! attach_prompt_handler(&transport.router(), GCODE_RESPONSE_METHOD, &accumulator);
//! ```

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod accumulator;
pub mod action;
pub mod config;
pub mod console;
pub mod dispatch;
pub mod presenter;
pub mod prompt;
pub mod transport;

// Re-exports for convenience
pub use accumulator::{ActivationOutcome, PromptAccumulator};
pub use action::{ActionComment, ActionCommentExtractor, ACTION_MARKER};
pub use config::{load_config, ConfigError, ConfigOverrides, ConfigSource, PanelConfig};
pub use console::{attach_prompt_handler, console_line, GCODE_RESPONSE_METHOD};
pub use dispatch::CommandDispatcher;
pub use presenter::{
    ActivationCallback, HeadlessPresenter, PresenterEvent, PresenterHandle, PromptLayout,
    PromptPresenter,
};
pub use prompt::{
    parse_button_spec, ButtonStyle, PromptButton, PromptId, PromptModel, PromptSnapshot,
    PromptState,
};
pub use transport::{
    CommandSink, InProcessTransport, NotificationRouter, PrinterTransport, TransportConfig,
    TransportError,
};
