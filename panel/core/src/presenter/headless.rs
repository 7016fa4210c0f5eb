//! Headless Presenter
//!
//! Records what would have been drawn and lets callers "press" buttons on
//! the open modal. Used by tests and by surfaces without a screen.
//!
//! Only the most recent [`EVENT_HISTORY`] events are kept, so a
//! long-running session stays bounded.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::layout::PromptLayout;
use super::{PresenterHandle, PromptPresenter};
use crate::presenter::ActivationCallback;
use crate::prompt::PromptSnapshot;

/// Events kept by [`HeadlessPresenter`]
pub const EVENT_HISTORY: usize = 256;

/// Something the headless presenter was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    /// A modal was rendered
    Rendered {
        /// Handle returned to the caller
        handle: PresenterHandle,
        /// What was shown
        snapshot: PromptSnapshot,
        /// Geometry it was shown with
        layout: PromptLayout,
    },

    /// A modal was closed
    Closed {
        /// Handle that was closed
        handle: PresenterHandle,
        /// Whether that modal was still open
        was_open: bool,
    },
}

struct OpenModal {
    handle: PresenterHandle,
    snapshot: PromptSnapshot,
    on_activate: Arc<dyn Fn(usize) + Send + Sync>,
}

#[derive(Default)]
struct HeadlessState {
    open: Option<OpenModal>,
    events: VecDeque<PresenterEvent>,
    renders: usize,
    last_layout: Option<PromptLayout>,
}

impl HeadlessState {
    fn record(&mut self, event: PresenterEvent) {
        if self.events.len() == EVENT_HISTORY {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Presenter that draws nothing
pub struct HeadlessPresenter {
    vertical_resolution: u32,
    state: Mutex<HeadlessState>,
}

impl HeadlessPresenter {
    /// Create a presenter for a display `vertical_resolution` units tall
    #[must_use]
    pub fn new(vertical_resolution: u32) -> Self {
        Self {
            vertical_resolution,
            state: Mutex::new(HeadlessState::default()),
        }
    }

    /// Snapshot of the modal currently open, if any
    #[must_use]
    pub fn open_prompt(&self) -> Option<PromptSnapshot> {
        self.state.lock().open.as_ref().map(|m| m.snapshot.clone())
    }

    /// Whether a modal is open
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.lock().open.is_some()
    }

    /// Activate button `index` on the open modal
    ///
    /// Returns false if no modal is open. The callback runs without any
    /// presenter lock held, so it may close the modal.
    pub fn press(&self, index: usize) -> bool {
        let callback = match &self.state.lock().open {
            Some(modal) => modal.on_activate.clone(),
            None => return false,
        };
        callback(index);
        true
    }

    /// Recent events, oldest first
    #[must_use]
    pub fn events(&self) -> Vec<PresenterEvent> {
        self.state.lock().events.iter().cloned().collect()
    }

    /// Number of `render` calls since creation
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.state.lock().renders
    }

    /// Layout of the most recent render
    #[must_use]
    pub fn last_layout(&self) -> Option<PromptLayout> {
        self.state.lock().last_layout
    }
}

impl PromptPresenter for HeadlessPresenter {
    fn render(&self, snapshot: &PromptSnapshot, on_activate: ActivationCallback) -> PresenterHandle {
        let handle = PresenterHandle::new();
        let layout = PromptLayout::compute(snapshot.button_count(), self.vertical_resolution);

        tracing::debug!(
            %handle,
            prompt_id = %snapshot.id,
            button_count = snapshot.button_count(),
            row_height = layout.button_row_height,
            "Headless render"
        );

        let mut state = self.state.lock();
        state.open = Some(OpenModal {
            handle,
            snapshot: snapshot.clone(),
            on_activate: Arc::from(on_activate),
        });
        state.renders += 1;
        state.last_layout = Some(layout);
        state.record(PresenterEvent::Rendered {
            handle,
            snapshot: snapshot.clone(),
            layout,
        });
        handle
    }

    fn close(&self, handle: PresenterHandle) {
        let mut state = self.state.lock();
        let was_open = state.open.as_ref().is_some_and(|m| m.handle == handle);
        if was_open {
            state.open = None;
        }
        state.record(PresenterEvent::Closed { handle, was_open });
    }
}
