//! Panel TUI - Terminal surface for printpanel
//!
//! Shows the printer's console output and pops action prompts up as
//! centered modals, answered from the keyboard.
//!
//! # Architecture
//!
//! - **Presenter**: `PromptPresenter` implementation backed by shared state
//! - **Widgets**: The prompt modal, laid out per `PromptLayout`
//! - **App**: Event loop (keyboard, resize, console feed)
//! - **Echo**: Command sink wrapper that mirrors sent commands to the console
//! - **Source**: Transcript or live feed, chosen from flags and config
//! - **Theme**: Colors per button style

pub mod app;
pub mod echo;
pub mod presenter;
pub mod source;
pub mod theme;
pub mod widgets;

pub use app::{App, AppEvent};
pub use echo::EchoSink;
pub use presenter::{ModalView, TuiPresenter};
pub use source::{feed_source, FeedSource};
