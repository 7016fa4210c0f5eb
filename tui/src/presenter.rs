//! TUI Presenter
//!
//! Holds the open modal in shared state. The accumulator writes it from
//! the notification path; the draw loop reads it every frame and routes
//! key presses back through the activation callback.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use panel_core::{ActivationCallback, PresenterHandle, PromptPresenter, PromptSnapshot};

struct OpenModal {
    handle: PresenterHandle,
    snapshot: PromptSnapshot,
    on_activate: Arc<dyn Fn(usize) + Send + Sync>,
    focus: usize,
}

/// What the draw loop needs to paint the modal
#[derive(Debug, Clone, PartialEq)]
pub struct ModalView {
    /// Prompt contents
    pub snapshot: PromptSnapshot,
    /// Index of the focused button
    pub focus: usize,
}

/// Presenter shared between the accumulator and the draw loop
///
/// Cheap to clone; clones share the same modal slot.
#[derive(Clone, Default)]
pub struct TuiPresenter {
    slot: Arc<Mutex<Option<OpenModal>>>,
}

impl TuiPresenter {
    /// Create a presenter with no modal open
    pub fn new() -> Self {
        Self::default()
    }

    /// Current modal, if any
    pub fn view(&self) -> Option<ModalView> {
        self.lock().as_ref().map(|modal| ModalView {
            snapshot: modal.snapshot.clone(),
            focus: modal.focus,
        })
    }

    /// Whether a modal is open
    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Move focus one button right, wrapping
    pub fn focus_next(&self) {
        if let Some(modal) = self.lock().as_mut() {
            let count = modal.snapshot.button_count();
            if count > 0 {
                modal.focus = (modal.focus + 1) % count;
            }
        }
    }

    /// Move focus one button left, wrapping
    pub fn focus_prev(&self) {
        if let Some(modal) = self.lock().as_mut() {
            let count = modal.snapshot.button_count();
            if count > 0 {
                modal.focus = (modal.focus + count - 1) % count;
            }
        }
    }

    /// Activate the focused button
    pub fn activate_focused(&self) -> bool {
        let focus = match self.lock().as_ref() {
            Some(modal) => modal.focus,
            None => return false,
        };
        self.activate(focus)
    }

    /// Activate button `index`
    ///
    /// Returns false if no modal is open. Range checking is the
    /// accumulator's job.
    pub fn activate(&self, index: usize) -> bool {
        let callback = match self.lock().as_ref() {
            Some(modal) => modal.on_activate.clone(),
            None => return false,
        };
        callback(index);
        true
    }

    /// Hide the modal without answering it
    pub fn dismiss(&self) -> bool {
        let dismissed = self.lock().take();
        if let Some(modal) = &dismissed {
            tracing::info!(handle = %modal.handle, prompt_id = %modal.snapshot.id, "Prompt dismissed locally");
        }
        dismissed.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<OpenModal>> {
        self.slot.lock()
    }
}

impl PromptPresenter for TuiPresenter {
    fn render(&self, snapshot: &PromptSnapshot, on_activate: ActivationCallback) -> PresenterHandle {
        let handle = PresenterHandle::new();
        tracing::debug!(%handle, prompt_id = %snapshot.id, "Showing prompt modal");

        *self.lock() = Some(OpenModal {
            handle,
            snapshot: snapshot.clone(),
            on_activate: Arc::from(on_activate),
            focus: 0,
        });
        handle
    }

    fn close(&self, handle: PresenterHandle) {
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|modal| modal.handle == handle) {
            *slot = None;
            tracing::debug!(%handle, "Closed prompt modal");
        }
    }
}
