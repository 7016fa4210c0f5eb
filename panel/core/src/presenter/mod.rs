//! Prompt Presenters
//!
//! A presenter is whatever puts the prompt in front of the operator: a
//! ratatui modal, a touchscreen dialog, a line on stdout. The core only
//! speaks to it through [`PromptPresenter`].
//!
//! # Contract
//!
//! - `render` receives an immutable [`PromptSnapshot`] and an
//!   [`ActivationCallback`]. It draws one control per button, in order,
//!   and returns a [`PresenterHandle`] identifying the modal.
//! - When the operator picks a button, the presenter calls the callback
//!   with the zero-based index. It may do so from any thread, at any time,
//!   even from inside `render`.
//! - `close` removes the modal. Closing a handle that is already gone is a
//!   no-op.
//!
//! Geometry every presenter should honor is in [`PromptLayout`].

mod headless;
mod layout;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::prompt::PromptSnapshot;

pub use headless::{HeadlessPresenter, PresenterEvent, EVENT_HISTORY};
pub use layout::{
    PromptLayout, DIALOG_HEIGHT_PERCENT, DIALOG_WIDTH_PERCENT, REFERENCE_VERTICAL_RESOLUTION,
};

/// Invoked by a presenter with the index of the activated button
pub type ActivationCallback = Box<dyn Fn(usize) + Send + Sync>;

/// Opaque identifier of a rendered modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PresenterHandle(u64);

impl PresenterHandle {
    /// Mint a new unique handle
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

impl Default for PresenterHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PresenterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "modal-{}", self.0)
    }
}

/// Something that can show a prompt and report the operator's choice
pub trait PromptPresenter: Send + Sync {
    /// Show `snapshot` as a modal
    fn render(&self, snapshot: &PromptSnapshot, on_activate: ActivationCallback) -> PresenterHandle;

    /// Remove a modal previously returned by `render`
    fn close(&self, handle: PresenterHandle);
}
