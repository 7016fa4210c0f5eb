//! Prompt Accumulator
//!
//! Assembles action comments into a prompt, presents it, and turns the
//! operator's choice into a dispatched command.
//!
//! # State Machine
//!
//! ```text
//!            begin (any state: discard everything, pre-empt)
//!        ┌───────────────────────────────────────────────────┐
//!        ▼                                                   │
//!   ┌─────────┐  begin   ┌──────────┐   show    ┌─────────┐  │
//!   │  Idle   │────────▶│ Building │─────────▶│  Shown  │──┘
//!   └─────────┘          └──────────┘           └─────────┘
//!        ▲                text, button               │ activate(i): dispatch,
//!        │                                           │ close modal, stay Shown
//!        └──────────────────── end ──────────────────┘
//! ```
//!
//! - `text` is accepted in Idle and Building; in Shown it is ignored.
//! - `button` and `show` are only accepted in Building.
//! - `end` in Idle is a no-op.
//!
//! # Thread Safety
//!
//! The model sits behind a single `parking_lot::Mutex`, held for the whole
//! of each mutation, snapshot, or index check. The presenter and the
//! dispatcher are always called after the lock is released, so a presenter
//! may activate a button from inside `render` without deadlocking.
//!
//! Each `show` mints a [`PromptId`]. The activation callback handed to the
//! presenter holds only a weak reference to the accumulator plus that id,
//! so taps on a modal that was pre-empted, or a second tap on the same
//! modal, are recognized and ignored.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::action::{ActionComment, ActionCommentExtractor};
use crate::dispatch::CommandDispatcher;
use crate::presenter::{ActivationCallback, PresenterHandle, PromptPresenter};
use crate::prompt::{parse_button_spec, PromptId, PromptModel, PromptState};

/// What happened to a button activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The button's command was dispatched
    Dispatched,
    /// Index was past the end of the button list
    OutOfRange,
    /// The activation belongs to a prompt that is no longer presented, or
    /// the prompt was already answered
    Stale,
    /// No prompt is being shown
    NotShown,
}

/// Bookkeeping for the prompt currently handed to the presenter
struct ShownPrompt {
    id: PromptId,
    /// `None` until `render` returns, and again once the modal was closed
    handle: Option<PresenterHandle>,
    activated: bool,
}

struct Session {
    model: PromptModel,
    shown: Option<ShownPrompt>,
}

impl Session {
    /// Forget the presented prompt, returning its modal if still open
    fn take_open_handle(&mut self) -> Option<PresenterHandle> {
        self.shown.take().and_then(|shown| shown.handle)
    }
}

struct Inner {
    session: Mutex<Session>,
    extractor: ActionCommentExtractor,
    presenter: Arc<dyn PromptPresenter>,
    dispatcher: CommandDispatcher,
}

/// Owns the prompt model and drives it from action comments
///
/// Cheap to clone; clones share the same prompt.
#[derive(Clone)]
pub struct PromptAccumulator {
    inner: Arc<Inner>,
}

impl PromptAccumulator {
    /// Create an idle accumulator
    #[must_use]
    pub fn new(presenter: Arc<dyn PromptPresenter>, dispatcher: CommandDispatcher) -> Self {
        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(Session {
                    model: PromptModel::new(),
                    shown: None,
                }),
                extractor: ActionCommentExtractor::new(),
                presenter,
                dispatcher,
            }),
        }
    }

    /// Classify one console line and apply it
    pub fn handle_line(&self, line: &str) {
        let comment = self.inner.extractor.classify(line);
        if comment.is_action() {
            tracing::trace!(line, action = comment.name(), "Action comment");
            self.apply(comment);
        }
    }

    /// Apply an already classified action comment
    pub fn apply(&self, comment: ActionComment) {
        match comment {
            ActionComment::NoAction => {}
            ActionComment::Begin(header) => self.begin(header),
            ActionComment::Text(body) => self.set_text(body),
            ActionComment::ButtonSpec(raw) => self.add_button(&raw),
            ActionComment::Show => self.show(),
            ActionComment::End => self.end(),
            ActionComment::UnknownAction(name) => {
                tracing::debug!(action = %name, "Ignoring unknown action");
            }
        }
    }

    /// Activate button `index` of the prompt presented as `prompt`
    ///
    /// Dispatches the button's command and closes the modal. The prompt
    /// stays in the Shown state until `prompt_end` or a new `prompt_begin`.
    pub fn activate(&self, prompt: PromptId, index: usize) -> ActivationOutcome {
        let (command, handle) = {
            let mut guard = self.inner.session.lock();
            let session = &mut *guard;

            if session.model.state != PromptState::Shown {
                tracing::debug!(prompt_id = %prompt, index, "Activation while no prompt is shown");
                return ActivationOutcome::NotShown;
            }
            let Some(shown) = session.shown.as_mut() else {
                return ActivationOutcome::NotShown;
            };
            if shown.id != prompt || shown.activated {
                tracing::warn!(
                    prompt_id = %prompt,
                    current = %shown.id,
                    index,
                    "Ignoring stale activation"
                );
                return ActivationOutcome::Stale;
            }
            let Some(button) = session.model.buttons.get(index) else {
                tracing::warn!(
                    prompt_id = %prompt,
                    index,
                    button_count = session.model.buttons.len(),
                    "Ignoring activation of nonexistent button"
                );
                return ActivationOutcome::OutOfRange;
            };

            shown.activated = true;
            tracing::debug!(prompt_id = %prompt, index, label = %button.label, "Button activated");
            (button.command.clone(), shown.handle.take())
        };

        self.inner.dispatcher.dispatch(&command);
        if let Some(handle) = handle {
            self.inner.presenter.close(handle);
        }
        ActivationOutcome::Dispatched
    }

    /// Activate button `index` of whichever prompt is currently presented
    pub fn activate_current(&self, index: usize) -> ActivationOutcome {
        let current = self.current_prompt();
        match current {
            Some(id) => self.activate(id, index),
            None => {
                tracing::debug!(index, "Activation while no prompt is shown");
                ActivationOutcome::NotShown
            }
        }
    }

    /// Copy of the current model
    #[must_use]
    pub fn snapshot(&self) -> PromptModel {
        self.inner.session.lock().model.clone()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> PromptState {
        self.inner.session.lock().model.state
    }

    /// Id of the presented prompt, if any
    #[must_use]
    pub fn current_prompt(&self) -> Option<PromptId> {
        self.inner.session.lock().shown.as_ref().map(|s| s.id)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn begin(&self, header: String) {
        let stale = {
            let mut session = self.inner.session.lock();
            let previous = session.model.state;
            let stale = session.take_open_handle();

            session.model.clear_content();
            session.model.header = Some(header);
            session.model.state = PromptState::Building;

            tracing::debug!(from = %previous, "Prompt begin");
            stale
        };

        if let Some(handle) = stale {
            tracing::debug!(%handle, "Closing pre-empted prompt");
            self.inner.presenter.close(handle);
        }
    }

    fn set_text(&self, body: String) {
        let mut session = self.inner.session.lock();
        if session.model.state == PromptState::Shown {
            tracing::warn!(body = %body, "Ignoring prompt_text while prompt is shown");
            return;
        }
        session.model.body = Some(body);
    }

    fn add_button(&self, raw: &str) {
        let mut session = self.inner.session.lock();
        if session.model.state != PromptState::Building {
            tracing::warn!(
                state = %session.model.state,
                spec = raw,
                "Ignoring prompt_footer_button outside of prompt_begin"
            );
            return;
        }

        let button = parse_button_spec(raw);
        tracing::debug!(
            label = %button.label,
            command = %button.command,
            style = %button.style,
            "Prompt button"
        );
        session.model.buttons.push(button);
    }

    fn show(&self) {
        let (id, snapshot) = {
            let mut session = self.inner.session.lock();
            if session.model.state != PromptState::Building {
                tracing::warn!(state = %session.model.state, "Ignoring prompt_show outside of prompt_begin");
                return;
            }

            let id = PromptId::new();
            session.model.state = PromptState::Shown;
            session.shown = Some(ShownPrompt {
                id,
                handle: None,
                activated: false,
            });
            (id, session.model.snapshot(id))
        };

        if snapshot.buttons.is_empty() {
            tracing::warn!(prompt_id = %id, "Showing prompt without buttons");
        }
        tracing::debug!(prompt_id = %id, button_count = snapshot.button_count(), "Prompt show");

        let handle = self
            .inner
            .presenter
            .render(&snapshot, activation_callback(Arc::downgrade(&self.inner), id));

        let close_now = {
            let mut session = self.inner.session.lock();
            match session.shown.as_mut() {
                Some(shown) if shown.id == id && !shown.activated => {
                    shown.handle = Some(handle);
                    false
                }
                _ => true,
            }
        };

        if close_now {
            tracing::debug!(prompt_id = %id, %handle, "Prompt superseded while rendering");
            self.inner.presenter.close(handle);
        }
    }

    fn end(&self) {
        let stale = {
            let mut session = self.inner.session.lock();
            if session.model.state == PromptState::Idle {
                tracing::trace!("prompt_end while idle");
                return;
            }

            let stale = session.take_open_handle();
            session.model.clear_content();
            session.model.state = PromptState::Idle;
            tracing::debug!("Prompt end");
            stale
        };

        if let Some(handle) = stale {
            self.inner.presenter.close(handle);
        }
    }
}

/// Callback for the presenter, bound to one presentation
fn activation_callback(inner: Weak<Inner>, id: PromptId) -> ActivationCallback {
    Box::new(move |index| match inner.upgrade() {
        Some(inner) => {
            PromptAccumulator { inner }.activate(id, index);
        }
        None => tracing::debug!(prompt_id = %id, index, "Activation after shutdown"),
    })
}

impl fmt::Debug for PromptAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.inner.session.lock();
        f.debug_struct("PromptAccumulator")
            .field("model", &session.model)
            .field("shown", &session.shown.as_ref().map(|s| s.id))
            .finish_non_exhaustive()
    }
}
